//! Terminal rendering of results.

use facelens_core::format::{format_timestamp, score_color};
use facelens_core::{DetectionRecord, Overlay, PersonRecord, SelectionSync};

pub fn person_line(idx: usize, person: &PersonRecord) -> String {
    format!("{:>3}. {} ({} images)", idx + 1, person.name, person.images.len())
}

pub fn detection_line(idx: usize, detection: &DetectionRecord, offset_hours: i32) -> String {
    let when = format_timestamp(&detection.date_time, offset_hours)
        .unwrap_or_else(|_| detection.date_time.clone());
    let names: Vec<String> = detection
        .bboxes
        .iter()
        .filter_map(|b| b.best().map(|c| c.name))
        .collect();
    format!(
        "{:>3}. {}  {}  {} faces  {}",
        idx + 1,
        when,
        detection.id,
        detection.bboxes.len(),
        names.join(", ")
    )
}

/// One block per face: overlay rectangle, best candidate, and the rest
/// of the candidates when that face's group is open.
pub fn faces(overlay: &Overlay, selection: &SelectionSync) -> String {
    if overlay.is_empty() {
        return "no faces detected\n".to_string();
    }
    let mut out = String::new();
    for (idx, (bbox, rect)) in overlay.boxes().iter().zip(overlay.rects()).enumerate() {
        let candidates = bbox.candidates();
        let open = selection.is_open(idx);
        let marker = if open { "-" } else { "+" };
        let geometry = if rect.is_empty() {
            "(no geometry)".to_string()
        } else {
            format!("at ({:.0}, {:.0}) {:.0}x{:.0}", rect.x, rect.y, rect.w, rect.h)
        };
        match candidates.first() {
            Some(best) => out.push_str(&format!(
                "[{}]{} {} {:.2} {}  {}\n",
                idx + 1,
                marker,
                best.name,
                best.score,
                score_color(best.score),
                geometry
            )),
            None => out.push_str(&format!("[{}]{} unknown  {}\n", idx + 1, marker, geometry)),
        }
        if open {
            for other in candidates.iter().skip(1) {
                out.push_str(&format!(
                    "      {} {:.2} {}\n",
                    other.name,
                    other.score,
                    score_color(other.score)
                ));
            }
        }
    }
    out
}
