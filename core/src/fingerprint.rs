//! Geo-semantic fingerprinting ("smart hash").
//!
//! Every complaint gets a deterministic 10-character fingerprint:
//!
//! ```text
//!     [TITLE:3][LAT:2][LON:2][DEPT:3]      e.g. POT4F7APWD
//! ```
//!
//! The title component is a semantic issue-category code, so synonyms
//! ("pothole", "crater") collapse to the same fingerprint. The location
//! component quantizes coordinates onto a ~30 m grid — double the 15 m
//! match tolerance, so two points ≤15 m apart share a cell, and the 3×3
//! neighborhood covers boundary straddling on top of that.
//!
//! Everything in this module is a pure function of its inputs; no I/O.

use crate::config::FingerprintConfig;

/// Grid cell ≈ 30 metres of latitude.
const LAT_CELL_DEG: f64 = 30.0 / 111_320.0;

/// Fuzzy keyword matches below this ratio are ignored.
const FUZZY_ACCEPT: f64 = 0.70;

/// Score assigned to substring containment between a token and a known
/// keyword. Beats most fuzzy ratios without outranking exact matches.
const CONTAINMENT_SCORE: f64 = 0.85;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Location component when coordinates are missing.
const NO_LOCATION: &str = "0000";

/// Title/department component when nothing identifiable remains.
const GENERIC: &str = "GEN";

// ── Title component ──────────────────────────────────────────────────────

/// Tokenize, lowercase, strip stopwords and short (≤2 char) tokens.
fn extract_keywords(config: &FingerprintConfig, title: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    let mut current = String::new();
    for ch in title.chars() {
        if ch.is_ascii_alphabetic() {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            keywords.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        keywords.push(current);
    }
    keywords.retain(|t| t.len() > 2 && !config.stopwords.contains(t));
    keywords
}

/// Resolve keywords to a semantic category code.
///
/// Pass 1: exact table lookup. Pass 2: substring containment (fixed score)
/// or normalized-Levenshtein ratio, keeping the best score ≥ 0.70. Table
/// order breaks score ties, so resolution is deterministic.
fn semantic_code(config: &FingerprintConfig, keywords: &[String]) -> Option<String> {
    for kw in keywords {
        if let Some((_, code)) = config
            .semantic_categories
            .iter()
            .find(|(known, _)| known == kw)
        {
            return Some(code.clone());
        }
    }

    let mut best: Option<&str> = None;
    let mut best_score = 0.0;
    for kw in keywords {
        for (known, code) in &config.semantic_categories {
            let score = if known.contains(kw.as_str()) || kw.contains(known.as_str()) {
                CONTAINMENT_SCORE
            } else {
                strsim::normalized_levenshtein(kw, known)
            };
            if score > best_score && score >= FUZZY_ACCEPT {
                best_score = score;
                best = Some(code);
            }
        }
    }
    best.map(str::to_owned)
}

/// 3-character uppercase semantic code for a complaint title.
pub fn title_code(config: &FingerprintConfig, title: &str) -> String {
    let keywords = extract_keywords(config, title);
    if keywords.is_empty() {
        return GENERIC.to_owned();
    }
    if let Some(code) = semantic_code(config, &keywords) {
        return code;
    }

    // No semantic match: deterministic digest of the sorted keyword set,
    // mapped to 3 uppercase letters.
    let mut sorted = keywords;
    sorted.sort();
    let digest = md5::compute(sorted.concat().as_bytes());
    digest.0[..3]
        .iter()
        .map(|b| char::from(b'A' + b % 26))
        .collect()
}

// ── Location component ───────────────────────────────────────────────────

/// Encode an integer into exactly 2 base-36 characters (mod 1296).
fn encode_base36_2(value: i64) -> String {
    let v = (value.rem_euclid(1296)) as usize;
    let mut s = String::with_capacity(2);
    s.push(BASE36[v / 36] as char);
    s.push(BASE36[v % 36] as char);
    s
}

fn lat_index(latitude: f64) -> i64 {
    (latitude / LAT_CELL_DEG).floor() as i64
}

/// Column index with a cos(latitude)-adjusted cell width, keeping cells
/// roughly square away from the equator.
fn lon_index(latitude: f64, longitude: f64) -> i64 {
    let cos_lat = latitude.to_radians().cos().max(1e-10);
    let lon_cell = LAT_CELL_DEG / cos_lat;
    (longitude / lon_cell).floor() as i64
}

fn location_code(latitude: Option<f64>, longitude: Option<f64>) -> String {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => {
            format!("{}{}", encode_base36_2(lat_index(lat)), encode_base36_2(lon_index(lat, lon)))
        }
        _ => NO_LOCATION.to_owned(),
    }
}

/// The primary cell code plus its 8 neighbors. Deduplicated (the mod-1296
/// wrap can fold distant cells together) and sorted for determinism.
fn location_codes_3x3(latitude: Option<f64>, longitude: Option<f64>) -> Vec<String> {
    let (lat, lon) = match (latitude, longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return vec![NO_LOCATION.to_owned()],
    };
    let row = lat_index(lat);
    let col = lon_index(lat, lon);
    let mut codes: Vec<String> = Vec::with_capacity(9);
    for d_row in -1..=1 {
        for d_col in -1..=1 {
            let code = format!(
                "{}{}",
                encode_base36_2(row + d_row),
                encode_base36_2(col + d_col)
            );
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes.sort();
    codes
}

// ── Department component ─────────────────────────────────────────────────

/// Stable 3-character department code: abbreviation table by substring
/// match, else the first three consonants padded with `X`.
pub fn department_code(config: &FingerprintConfig, department_name: Option<&str>) -> String {
    let name = match department_name {
        Some(n) if !n.trim().is_empty() => n.trim().to_lowercase(),
        _ => return GENERIC.to_owned(),
    };

    for (fragment, code) in &config.department_codes {
        if name.contains(fragment.as_str()) || fragment.contains(name.as_str()) {
            return code.clone();
        }
    }

    let mut code: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic() && !"aeiou".contains(*c))
        .take(3)
        .collect::<String>()
        .to_uppercase();
    while code.len() < 3 {
        code.push('X');
    }
    code
}

// ── Public surface ───────────────────────────────────────────────────────

/// Build the primary 10-character fingerprint stored on the complaint row.
pub fn compute_fingerprint(
    config: &FingerprintConfig,
    title: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    department_name: Option<&str>,
) -> String {
    format!(
        "{}{}{}",
        title_code(config, title),
        location_code(latitude, longitude),
        department_code(config, department_name)
    )
}

/// The primary fingerprint plus all neighbor-cell variants (up to 9).
///
/// Querying over this whole set removes the grid-boundary problem: any
/// two points ≤15 m apart share at least one fingerprint between their
/// candidate sets.
pub fn candidate_fingerprints(
    config: &FingerprintConfig,
    title: &str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    department_name: Option<&str>,
) -> Vec<String> {
    let t = title_code(config, title);
    let d = department_code(config, department_name);
    location_codes_3x3(latitude, longitude)
        .into_iter()
        .map(|loc| format!("{t}{loc}{d}"))
        .collect()
}

/// Great-circle distance in metres between two GPS points.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lam = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lam / 2.0).sin().powi(2);
    EARTH_RADIUS_M * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_wraps_modulo_1296() {
        assert_eq!(encode_base36_2(0), "00");
        assert_eq!(encode_base36_2(35), "0Z");
        assert_eq!(encode_base36_2(1295), "ZZ");
        assert_eq!(encode_base36_2(1296), "00");
        assert_eq!(encode_base36_2(-1), encode_base36_2(1295));
    }

    #[test]
    fn missing_coordinates_use_placeholder() {
        let config = FingerprintConfig::default();
        let fp = compute_fingerprint(&config, "Open manhole", None, None, Some("Sewerage"));
        assert_eq!(&fp[3..7], "0000");
        assert_eq!(
            candidate_fingerprints(&config, "Open manhole", None, None, Some("Sewerage")).len(),
            1
        );
    }
}
