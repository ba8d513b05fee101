mod stamp;

pub use stamp::PdfTemplates;

use crate::config::{Align, Layout};
use crate::error::{InvoiceError, Result};
use crate::invoice::InvoiceFigures;

/// Point size for every stamped field.
pub const TEXT_SIZE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// One opened template document. Implementations place literal text at
/// absolute top-down coordinates and hand back the composed bytes.
pub trait TemplateDoc: std::fmt::Debug {
    fn set_font(&mut self, weight: FontWeight, size: f32) -> Result<()>;

    #[allow(clippy::too_many_arguments)]
    fn insert_text(
        &mut self,
        text: &str,
        page: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        align: Align,
    ) -> Result<()>;

    fn finish(self: Box<Self>) -> Result<Vec<u8>>;
}

/// Opens the per-stylist invoice template.
pub trait TemplateStore: Sync {
    fn open(&self, stylist: &str) -> Result<Box<dyn TemplateDoc>>;
}

/// Stamp every layout field onto the stylist's template, in layout order.
/// The font is switched around bold placements and restored to regular for
/// the ones that follow.
pub fn fill_document(
    store: &dyn TemplateStore,
    layout: &Layout,
    figures: &InvoiceFigures,
    symbol: &str,
) -> Result<Vec<u8>> {
    if layout.placements.is_empty() {
        return Err(InvoiceError::EmptyLayout);
    }

    let mut doc = store.open(&figures.stylist)?;
    let mut current = FontWeight::Regular;
    doc.set_font(current, TEXT_SIZE)?;

    for placement in &layout.placements {
        let weight = if placement.bold {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        };
        if weight != current {
            doc.set_font(weight, TEXT_SIZE)?;
            current = weight;
        }

        let text = figures.field_text(placement.field, symbol);
        doc.insert_text(
            &text,
            placement.page,
            placement.x,
            placement.y,
            placement.width,
            placement.height,
            placement.align,
        )
        .map_err(|e| match e {
            InvoiceError::Placement { .. } => e,
            other => InvoiceError::Placement {
                field: placement.field.name().to_string(),
                reason: other.to_string(),
            },
        })?;
    }

    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::RawRecord;
    use crate::config::{Field, Placement, Rates};
    use crate::invoice::compute;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        SetFont(FontWeight),
        Insert(String),
    }

    #[derive(Default)]
    struct RecordingStore {
        calls: Arc<Mutex<Vec<Call>>>,
    }

    #[derive(Debug)]
    struct RecordingDoc {
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl TemplateStore for RecordingStore {
        fn open(&self, _stylist: &str) -> Result<Box<dyn TemplateDoc>> {
            Ok(Box::new(RecordingDoc {
                calls: Arc::clone(&self.calls),
            }))
        }
    }

    impl TemplateDoc for RecordingDoc {
        fn set_font(&mut self, weight: FontWeight, _size: f32) -> Result<()> {
            self.calls.lock().unwrap().push(Call::SetFont(weight));
            Ok(())
        }

        fn insert_text(
            &mut self,
            text: &str,
            _page: u32,
            _x: f32,
            _y: f32,
            _width: f32,
            _height: f32,
            _align: Align,
        ) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Insert(text.to_string()));
            Ok(())
        }

        fn finish(self: Box<Self>) -> Result<Vec<u8>> {
            Ok(b"%PDF".to_vec())
        }
    }

    fn figures() -> crate::invoice::InvoiceFigures {
        let record = RawRecord {
            stylist: "Sam Carter".to_string(),
            invoice: "1041".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 5, 21).unwrap(),
            period_from: NaiveDate::from_ymd_opt(2022, 5, 9).unwrap(),
            period_to: NaiveDate::from_ymd_opt(2022, 5, 20).unwrap(),
            weeks: 4,
            services: 1000.0,
            products: 200.0,
            tips: 50.0,
            extra: 0.0,
        };
        let rates = Rates {
            commission: 0.45,
            weekly: 5.00,
            vat: 0.20,
            retail_cost: 0.5,
            retail_commission: 0.4,
        };
        compute(&record, &rates)
    }

    fn placement(field: Field, bold: bool) -> Placement {
        Placement {
            field,
            page: 1,
            x: 200.0,
            y: 400.0,
            width: 100.0,
            height: 100.0,
            align: Align::Center,
            bold,
        }
    }

    #[test]
    fn placements_apply_in_layout_order_with_font_toggling() {
        let layout = Layout {
            placements: vec![
                placement(Field::InvoiceNumber, false),
                placement(Field::ServiceCharge, false),
                placement(Field::TotalRelease, true),
                placement(Field::FooterDate, false),
            ],
        };
        let store = RecordingStore::default();

        let bytes = fill_document(&store, &layout, &figures(), "£").unwrap();
        assert_eq!(bytes, b"%PDF");

        let calls = store.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                Call::SetFont(FontWeight::Regular),
                Call::Insert("1041".to_string()),
                Call::Insert("£427.50".to_string()),
                Call::SetFont(FontWeight::Bold),
                Call::Insert("£565.00".to_string()),
                Call::SetFont(FontWeight::Regular),
                Call::Insert("21-05-2022".to_string()),
            ]
        );
    }

    #[test]
    fn empty_layout_is_an_error() {
        let layout = Layout {
            placements: Vec::new(),
        };
        let store = RecordingStore::default();
        assert!(matches!(
            fill_document(&store, &layout, &figures(), "£"),
            Err(InvoiceError::EmptyLayout)
        ));
    }
}
