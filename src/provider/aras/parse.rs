//! Page-state interpretation for the Aras Kargo tracking site.
//!
//! Pure functions over captured HTML, so the selector glue stays testable
//! without a browser. Selectors target the ASP.NET markup of
//! kargotakip.araskargo.com.tr; when the carrier reshuffles its markup,
//! this is the file to fix.

use crate::error::TrackError;
use crate::model::{CargoInfo, FailureReason, MovementInfo, ServiceInfo, TrackingStatus};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Casing variants of the carrier's "no record" marker.
const NOT_FOUND_MARKERS: &[&str] = &[
    "kayıt bulunamadı",
    "Kayıt Bulunamadı",
    "KAYIT BULUNAMADI",
];

/// Path fragment a successful query lands on, compared lowercased.
pub const RESULT_PAGE_MARKER: &str = "kargotakip.aspx";

/// Raw status substring meaning the shipment was delivered. Compared
/// case-sensitively: the dotted İ does not survive ASCII case tricks.
const DELIVERED_MARKER: &str = "TESLİM EDİLDİ";
/// Raw status substring meaning the shipment is still moving.
const IN_TRANSIT_MARKER: &str = "YOLDA";

/// Column captions of the movements grid; a row carrying one in its first
/// cells is a grid header, not a movement. Event status texts share words
/// with these ("KARGO İŞLEM GÖRDÜ"), so cells are compared whole, never by
/// substring.
const MOVEMENT_HEADER_LABELS: &[&str] = &[
    "TARİH",
    "İŞLEM",
    "İŞLEM GÖREN BİRİM",
    "AÇIKLAMA",
    "BİRİM",
];

/// Leading day.month.year token, e.g. `3.7.2024` or `03.07.2024 09:12`.
fn movement_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}").expect("date token pattern"))
}

/// True when the page carries the carrier's "no record" marker.
///
/// Checked before anything else: the marker can appear both on the search
/// page and on the results page, and it wins over any other page state.
pub fn is_not_found_page(html: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|marker| html.contains(marker))
}

/// Classify raw status text into the query outcome.
///
/// Ordered substring match: the delivered marker wins, then the in-transit
/// marker; everything else is `Error`, including strings the page renders
/// for its own technical faults.
pub fn classify_status(raw_status: &str) -> TrackingStatus {
    if raw_status.contains(DELIVERED_MARKER) {
        TrackingStatus::Delivered
    } else if raw_status.contains(IN_TRANSIT_MARKER) {
        TrackingStatus::InTransit
    } else {
        TrackingStatus::Error
    }
}

/// Extract the labeled shipment fields from the main results view.
///
/// Values are taken verbatim from the page. Only the status label is
/// required; any other missing label degrades to an empty string rather
/// than failing the whole query.
pub fn extract_cargo_info(html: &str, tracking_number: &str) -> Result<CargoInfo, TrackError> {
    let doc = Html::parse_document(html);

    let status = text_of(&doc, "#LblDurum").ok_or(TrackError::MissingField("durum"))?;

    let info = CargoInfo {
        tracking_number: tracking_number.to_string(),
        waybill_number: text_of(&doc, "#LblIrsaliyeNo").unwrap_or_default(),
        sender_branch: text_of(&doc, "#LblCikisSube").unwrap_or_default(),
        receiver_branch: text_of(&doc, "#LblVarisSube").unwrap_or_default(),
        sender: text_of(&doc, "#LblGonderen").unwrap_or_default(),
        recipient: text_of(&doc, "#LblAlici").unwrap_or_default(),
        status,
        shipment_date: text_of(&doc, "#LblCikisTarihi").unwrap_or_default(),
        delivery_date: text_of(&doc, "#LblTeslimTarihi"),
        cargo_type: text_of(&doc, "#LblKargoTuru").unwrap_or_default(),
        weight: text_of(&doc, "#LblAgirlik").unwrap_or_default(),
        package_count: text_of(&doc, "#LblParcaSayisi").unwrap_or_default(),
        payment_type: text_of(&doc, "#LblOdemeTipi").unwrap_or_default(),
        delivery_method: text_of(&doc, "#LblTeslimSekli").unwrap_or_default(),
        sms_code: text_of(&doc, "#LblSmsKodu").unwrap_or_default(),
        failure_reasons: parse_failure_reasons(&doc),
        movements: Vec::new(),
        service_info: None,
    };

    Ok(info)
}

/// Scan the movements grid, keeping only genuine event rows.
///
/// A row survives iff its first cell starts with a `d.m.yyyy` date token,
/// none of its first three cells is exactly a grid caption, and date,
/// location and status are all non-empty. Page order is preserved.
pub fn parse_movements(html: &str) -> Vec<MovementInfo> {
    let doc = Html::parse_document(html);
    let Ok(row_sel) = Selector::parse("#grdHareketler tr") else {
        return Vec::new();
    };
    let Ok(cell_sel) = Selector::parse("td") else {
        return Vec::new();
    };

    let mut movements = Vec::new();
    for row in doc.select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
        if let Some(movement) = movement_from_cells(&cells) {
            movements.push(movement);
        }
    }
    movements
}

fn movement_from_cells(cells: &[String]) -> Option<MovementInfo> {
    if cells.len() < 3 {
        return None;
    }
    if !movement_date_re().is_match(&cells[0]) {
        return None;
    }
    let header = cells
        .iter()
        .take(3)
        .any(|cell| MOVEMENT_HEADER_LABELS.contains(&cell.as_str()));
    if header {
        return None;
    }
    if cells[1].is_empty() || cells[2].is_empty() {
        return None;
    }

    Some(MovementInfo {
        date: cells[0].clone(),
        location: cells[1].clone(),
        status: cells[2].clone(),
        description: cells.get(3).filter(|s| !s.is_empty()).cloned(),
    })
}

/// Failed delivery attempts listed on the main results view.
///
/// Rows follow the movement eligibility rule: they lead with a date token.
fn parse_failure_reasons(doc: &Html) -> Vec<FailureReason> {
    let Ok(row_sel) = Selector::parse("#grdTeslimEdilememe tr") else {
        return Vec::new();
    };
    let Ok(cell_sel) = Selector::parse("td") else {
        return Vec::new();
    };

    let mut reasons = Vec::new();
    for row in doc.select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
        if cells.len() < 2 || !movement_date_re().is_match(&cells[0]) {
            continue;
        }
        reasons.push(FailureReason {
            date: cells[0].clone(),
            reason: cells[1].clone(),
            description: cells.get(2).cloned().unwrap_or_default(),
        });
    }
    reasons
}

/// Service/SMS details from the service view. Missing pieces stay empty.
pub fn parse_service_info(html: &str) -> ServiceInfo {
    let doc = Html::parse_document(html);
    ServiceInfo {
        service_type: text_of(&doc, "#LblServisTipi").unwrap_or_default(),
        sms_notifications: list_texts(&doc, "#grdSmsBildirimleri td"),
        additional_services: list_texts(&doc, "#grdEkHizmetler td"),
    }
}

/// Trimmed text of the first element matching `selector`, when non-empty.
fn text_of(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let elem = doc.select(&sel).next()?;
    let text = elem.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Non-empty trimmed texts of every element matching `selector`.
fn list_texts(doc: &Html, selector: &str) -> Vec<String> {
    let Ok(sel) = Selector::parse(selector) else {
        return Vec::new();
    };
    doc.select(&sel)
        .map(cell_text)
        .filter(|s| !s.is_empty())
        .collect()
}

fn cell_text(elem: ElementRef<'_>) -> String {
    elem.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT_PAGE: &str = r#"
<html><body>
  <span id="LblDurum">TESLİM EDİLDİ</span>
  <span id="LblIrsaliyeNo">IRS-445</span>
  <span id="LblCikisSube">ISTANBUL AVR.</span>
  <span id="LblVarisSube">ANKARA</span>
  <span id="LblGonderen">ACME TEKSTİL A.Ş.</span>
  <span id="LblAlici">AYŞE YILMAZ</span>
  <span id="LblCikisTarihi">01.07.2024</span>
  <span id="LblTeslimTarihi">03.07.2024</span>
  <span id="LblKargoTuru">KOLİ</span>
  <span id="LblAgirlik">2,5</span>
  <span id="LblParcaSayisi">1</span>
  <span id="LblOdemeTipi">GÖNDERİCİ ÖDEMELİ</span>
  <span id="LblTeslimSekli">ADRESE TESLİM</span>
  <span id="LblSmsKodu">A1B2C3</span>
</body></html>"#;

    #[test]
    fn test_extract_full_results_page() {
        let info = extract_cargo_info(RESULT_PAGE, "1234567890123").unwrap();
        assert_eq!(info.tracking_number, "1234567890123");
        assert_eq!(info.status, "TESLİM EDİLDİ");
        assert_eq!(info.waybill_number, "IRS-445");
        assert_eq!(info.sender_branch, "ISTANBUL AVR.");
        assert_eq!(info.receiver_branch, "ANKARA");
        assert_eq!(info.sender, "ACME TEKSTİL A.Ş.");
        assert_eq!(info.recipient, "AYŞE YILMAZ");
        assert_eq!(info.shipment_date, "01.07.2024");
        assert_eq!(info.delivery_date.as_deref(), Some("03.07.2024"));
        assert_eq!(info.weight, "2,5");
        assert_eq!(info.package_count, "1");
        assert_eq!(info.sms_code, "A1B2C3");
    }

    #[test]
    fn test_extract_requires_status_label() {
        let err = extract_cargo_info("<html><body></body></html>", "123").unwrap_err();
        assert!(matches!(err, TrackError::MissingField("durum")));
    }

    #[test]
    fn test_extract_tolerates_missing_secondary_labels() {
        let html = r#"<span id="LblDurum">YOLDA</span>"#;
        let info = extract_cargo_info(html, "99").unwrap();
        assert_eq!(info.status, "YOLDA");
        assert_eq!(info.sender, "");
        assert_eq!(info.delivery_date, None);
        assert!(info.failure_reasons.is_empty());
    }

    #[test]
    fn test_blank_delivery_date_stays_none() {
        let html = r#"<span id="LblDurum">YOLDA</span><span id="LblTeslimTarihi">   </span>"#;
        let info = extract_cargo_info(html, "99").unwrap();
        assert_eq!(info.delivery_date, None);
    }

    #[test]
    fn test_not_found_marker_variants() {
        assert!(is_not_found_page(
            "<div>Aradığınız kriterlere uygun kayıt bulunamadı.</div>"
        ));
        assert!(is_not_found_page("<b>Kayıt Bulunamadı!</b>"));
        assert!(is_not_found_page("<td>KAYIT BULUNAMADI</td>"));
        assert!(!is_not_found_page("<div>TESLİM EDİLDİ</div>"));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status("TESLİM EDİLDİ"), TrackingStatus::Delivered);
        assert_eq!(
            classify_status("KARGO TESLİM EDİLDİ 03.07.2024"),
            TrackingStatus::Delivered
        );
        assert_eq!(classify_status("KARGONUZ YOLDA"), TrackingStatus::InTransit);
        assert_eq!(classify_status("ŞUBEDE BEKLİYOR"), TrackingStatus::Error);
        assert_eq!(classify_status(""), TrackingStatus::Error);
    }

    const MOVEMENTS_PAGE: &str = r#"
<table id="grdHareketler">
  <tr><td>TARİH</td><td>İŞLEM GÖREN BİRİM</td><td>AÇIKLAMA</td></tr>
  <tr><td>01.07.2024 09:12</td><td>ISTANBUL AVR. BÖLGE MD.</td><td>KARGO ÇIKIŞ YAPTI</td><td>Araç A-34</td></tr>
  <tr><td>02.07.2024 18:40</td><td>ANKARA BÖLGE MD.</td><td>KARGO GELDİ</td></tr>
  <tr><td>Toplam</td><td>2</td><td>kayıt</td></tr>
  <tr><td>03.07.2024</td><td></td><td>TESLİMATTA</td></tr>
</table>"#;

    #[test]
    fn test_parse_movements_keeps_event_rows_in_page_order() {
        let movements = parse_movements(MOVEMENTS_PAGE);
        assert_eq!(movements.len(), 2);

        assert_eq!(movements[0].date, "01.07.2024 09:12");
        assert_eq!(movements[0].location, "ISTANBUL AVR. BÖLGE MD.");
        assert_eq!(movements[0].status, "KARGO ÇIKIŞ YAPTI");
        assert_eq!(movements[0].description.as_deref(), Some("Araç A-34"));

        assert_eq!(movements[1].date, "02.07.2024 18:40");
        assert_eq!(movements[1].description, None);
    }

    #[test]
    fn test_parse_movements_rejects_caption_cell_in_dated_row() {
        let html = r#"<table id="grdHareketler">
            <tr><td>01.07.2024</td><td>TARİH</td><td>X</td></tr>
        </table>"#;
        assert!(parse_movements(html).is_empty());
    }

    #[test]
    fn test_parse_movements_keeps_statuses_sharing_caption_words() {
        // "KARGO İŞLEM GÖRDÜ" contains the caption word İŞLEM; only a cell
        // that is exactly a caption marks a header row.
        let html = r#"<table id="grdHareketler">
            <tr><td>TARİH</td><td>İŞLEM GÖREN BİRİM</td><td>AÇIKLAMA</td></tr>
            <tr><td>01.07.2024 08:05</td><td>İZMİR ŞUBE</td><td>KARGO İŞLEM GÖRDÜ</td></tr>
            <tr><td>02.07.2024 17:30</td><td>ANKARA BÖLGE MD.</td><td>KARGO GELDİ</td></tr>
        </table>"#;
        let movements = parse_movements(html);
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].status, "KARGO İŞLEM GÖRDÜ");
        assert_eq!(movements[1].status, "KARGO GELDİ");
    }

    #[test]
    fn test_parse_movements_accepts_single_digit_date_parts() {
        let html = r#"<table id="grdHareketler">
            <tr><td>3.7.2024</td><td>İZMİR ŞUBE</td><td>KARGO İŞLEM GÖRDÜ</td></tr>
        </table>"#;
        let movements = parse_movements(html);
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].date, "3.7.2024");
    }

    #[test]
    fn test_parse_movements_on_garbage_html() {
        assert!(parse_movements("").is_empty());
        assert!(parse_movements("<<<not html at all").is_empty());
        assert!(parse_movements("<p>no grid here</p>").is_empty());
    }

    #[test]
    fn test_parse_failure_reasons() {
        let html = r#"
<span id="LblDurum">YOLDA</span>
<table id="grdTeslimEdilememe">
  <tr><td>TARİH</td><td>NEDEN</td><td>AÇIKLAMA</td></tr>
  <tr><td>02.07.2024</td><td>ADRESTE BULUNAMADI</td><td>Yarın tekrar denenecek</td></tr>
  <tr><td>03.07.2024</td><td>ADRES YETERSİZ</td></tr>
</table>"#;
        let info = extract_cargo_info(html, "55").unwrap();
        assert_eq!(info.failure_reasons.len(), 2);
        assert_eq!(info.failure_reasons[0].reason, "ADRESTE BULUNAMADI");
        assert_eq!(
            info.failure_reasons[0].description,
            "Yarın tekrar denenecek"
        );
        assert_eq!(info.failure_reasons[1].description, "");
    }

    #[test]
    fn test_parse_service_info_reads_grids() {
        let html = r#"
<span id="LblServisTipi">STANDART</span>
<table id="grdSmsBildirimleri">
  <tr><td>ÇIKIŞ SMS</td></tr>
  <tr><td>TESLİMAT SMS</td></tr>
</table>
<table id="grdEkHizmetler">
  <tr><td>KAPIDA ÖDEME</td></tr>
</table>"#;
        let service = parse_service_info(html);
        assert_eq!(service.service_type, "STANDART");
        assert_eq!(service.sms_notifications, vec!["ÇIKIŞ SMS", "TESLİMAT SMS"]);
        assert_eq!(service.additional_services, vec!["KAPIDA ÖDEME"]);
    }

    #[test]
    fn test_parse_service_info_defaults_when_absent() {
        assert_eq!(parse_service_info("<html></html>"), ServiceInfo::default());
    }
}
