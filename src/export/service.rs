use printpdf::{BuiltinFont, Mm, PdfDocument};
use time::Date;

use crate::subscriptions::dto::SubscriptionResponse;
use crate::subscriptions::repo::{format_date, Subscription};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_LEFT_MM: f32 = 15.0;
const TOP_CURSOR_MM: f32 = 280.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const LINE_STEP_MM: f32 = 6.0;

pub const PDF_TITLE: &str = "SubTrack - Subscriptions Report";

/// One row per subscription, columns identical to the JSON wire record,
/// header row included.
pub fn render_csv(subs: &[Subscription], today: Date) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for sub in subs {
        writer.serialize(SubscriptionResponse::from_record(sub, today))?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("finish csv: {e}"))
}

/// Title line, then one line per subscription ordered by (category, name),
/// breaking to a fresh page whenever the cursor reaches the bottom margin.
pub fn render_pdf(subs: &[Subscription]) -> anyhow::Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        PDF_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut cursor = TOP_CURSOR_MM;
    layer.use_text(PDF_TITLE, 16.0, Mm(MARGIN_LEFT_MM), Mm(cursor), &bold);
    cursor -= 2.0 * LINE_STEP_MM;

    let mut ordered: Vec<&Subscription> = subs.iter().collect();
    ordered.sort_by(|a, b| {
        (a.category.as_str(), a.name.as_str()).cmp(&(b.category.as_str(), b.name.as_str()))
    });

    for sub in ordered {
        let line = format!(
            "{} | {} | ${:.2} | {} | next {}",
            sub.category,
            sub.name,
            sub.cost,
            sub.billing_cycle,
            format_date(sub.next_payment),
        );
        layer.use_text(line, 11.0, Mm(MARGIN_LEFT_MM), Mm(cursor), &regular);
        cursor -= LINE_STEP_MM;
        if cursor < BOTTOM_MARGIN_MM {
            let (page, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(layer_index);
            cursor = TOP_CURSOR_MM;
        }
    }

    let bytes = doc.save_to_bytes()?;
    Ok(bytes)
}
