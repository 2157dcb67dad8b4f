//! Replaceable configuration data for the routing core.
//!
//! The keyword and department tables directly set the fingerprint
//! collision/miss rates, so they are data, not algorithm: deployments can
//! load their own via serde, and the defaults reproduce the curated
//! English/India tables the system shipped with.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default resolution SLA applied when a category has no configuration
/// row and the classifier offered nothing better.
pub const DEFAULT_RESOLUTION_HOURS: i64 = 48;

/// Top of the 1..=5 priority scale; escalation bumps never exceed it.
pub const MAX_PRIORITY: i64 = 5;

/// Hours before the escalation deadline at which warnings start, unless
/// overridden per sweep.
pub const DEFAULT_WARNING_THRESHOLD_HOURS: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Tokens stripped from titles before keyword resolution. Aggressive:
    /// includes filler adjectives and generic location nouns so only the
    /// civic-issue noun survives.
    pub stopwords: HashSet<String>,
    /// Keyword → 3-char semantic category code. Order matters: fuzzy
    /// matching scans in table order and keeps the first best score.
    pub semantic_categories: Vec<(String, String)>,
    /// Department-name fragment → 3-char department code, matched by
    /// substring in table order.
    pub department_codes: Vec<(String, String)>,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            stopwords: default_stopwords(),
            semantic_categories: default_semantic_categories(),
            department_codes: default_department_codes(),
        }
    }
}

fn default_stopwords() -> HashSet<String> {
    // Determiners/pronouns/prepositions, filler adjectives, and generic
    // locality nouns that never identify the issue type.
    const WORDS: &str = "a an the is are was were be been being have has had do does did \
        will would shall should may might can could of in on at to for with by from up \
        about into through during before after above below between out off over under \
        again further then once here there when where why how all each every both few \
        more most other some such no nor not only own same so than too very just because \
        as until while also and but or if this that these those it its i me my we our \
        you your he him his she her they them their what which who whom much many near \
        big large small huge major minor severe bad worst terrible horrible serious \
        heavy deep broken damaged public local main old new massive dirty filthy \
        unhygienic unsanitary unclean smelly stinking foul rotten extremely highly \
        quite really totally completely absolutely partially poorly badly urgently \
        immediate urgent critical dangerous facility area zone place spot site point \
        section issue problem complaint report condition situation matter concern \
        state status road street lane avenue colony ward block sector locality \
        mohalla nagar chowk circle bazaar market";
    WORDS.split_whitespace().map(str::to_owned).collect()
}

fn default_semantic_categories() -> Vec<(String, String)> {
    const TABLE: &[(&str, &str)] = &[
        // Pothole / road-surface damage
        ("pothole", "POT"),
        ("potholes", "POT"),
        ("crater", "POT"),
        ("craters", "POT"),
        ("roadhole", "POT"),
        // General road / pavement damage
        ("pavement", "RDD"),
        ("asphalt", "RDD"),
        ("tar", "RDD"),
        ("bitumen", "RDD"),
        ("resurfacing", "RDD"),
        ("resurface", "RDD"),
        // Garbage / waste
        ("garbage", "GRB"),
        ("trash", "GRB"),
        ("waste", "GRB"),
        ("litter", "GRB"),
        ("littering", "GRB"),
        ("rubbish", "GRB"),
        ("debris", "GRB"),
        ("dump", "GRB"),
        ("dumping", "GRB"),
        ("dumpsite", "GRB"),
        ("dumpyard", "GRB"),
        // Sewage / drainage
        ("sewage", "SEW"),
        ("sewer", "SEW"),
        ("drain", "SEW"),
        ("drainage", "SEW"),
        ("clogged", "SEW"),
        ("blocked", "SEW"),
        ("overflow", "SEW"),
        ("overflowing", "SEW"),
        ("manhole", "SEW"),
        ("manholes", "SEW"),
        ("gutter", "SEW"),
        ("nala", "SEW"),
        ("nallah", "SEW"),
        // Streetlight
        ("streetlight", "SLT"),
        ("streetlights", "SLT"),
        ("lamp", "SLT"),
        ("lamppost", "SLT"),
        ("bulb", "SLT"),
        ("light", "SLT"),
        ("lighting", "SLT"),
        ("darkspot", "SLT"),
        ("dark", "SLT"),
        // Electricity / power
        ("electricity", "ELC"),
        ("power", "ELC"),
        ("powercut", "ELC"),
        ("outage", "ELC"),
        ("blackout", "ELC"),
        ("transformer", "ELC"),
        ("wire", "ELC"),
        ("wiring", "ELC"),
        ("cable", "ELC"),
        ("electrocution", "ELC"),
        ("spark", "ELC"),
        ("sparking", "ELC"),
        // Water supply
        ("water", "WTR"),
        ("watersupply", "WTR"),
        ("tap", "WTR"),
        ("pipeline", "WTR"),
        ("pipe", "WTR"),
        ("pipes", "WTR"),
        ("leakage", "WTR"),
        ("leak", "WTR"),
        ("leaking", "WTR"),
        ("burst", "WTR"),
        ("borewell", "WTR"),
        ("borehole", "WTR"),
        ("tanker", "WTR"),
        // Waterlogging / flooding
        ("waterlogging", "WLG"),
        ("waterlogged", "WLG"),
        ("flood", "WLG"),
        ("flooding", "WLG"),
        ("stagnant", "WLG"),
        ("stagnation", "WLG"),
        ("puddle", "WLG"),
        ("inundation", "WLG"),
        // Toilet / sanitation
        ("toilet", "SAN"),
        ("toilets", "SAN"),
        ("urinal", "SAN"),
        ("urinals", "SAN"),
        ("lavatory", "SAN"),
        ("restroom", "SAN"),
        ("washroom", "SAN"),
        ("bathroom", "SAN"),
        ("sanitation", "SAN"),
        ("defecation", "SAN"),
        // Footpath / sidewalk
        ("footpath", "FTP"),
        ("sidewalk", "FTP"),
        ("walkway", "FTP"),
        ("pedestrian", "FTP"),
        ("encroachment", "FTP"),
        // Park / garden / tree
        ("park", "PRK"),
        ("garden", "PRK"),
        ("tree", "PRK"),
        ("trees", "PRK"),
        ("branch", "PRK"),
        ("fallen", "PRK"),
        ("uprooted", "PRK"),
        ("pruning", "PRK"),
        ("greenery", "PRK"),
        ("plantation", "PRK"),
        // Traffic / signal
        ("traffic", "TRF"),
        ("signal", "TRF"),
        ("signals", "TRF"),
        ("congestion", "TRF"),
        ("jam", "TRF"),
        ("trafficjam", "TRF"),
        ("zebra", "TRF"),
        ("crossing", "TRF"),
        ("divider", "TRF"),
        ("barricade", "TRF"),
        ("sign", "TRF"),
        ("signboard", "TRF"),
        // Noise / pollution
        ("noise", "NOS"),
        ("pollution", "NOS"),
        ("honking", "NOS"),
        ("loudspeaker", "NOS"),
        ("construction", "NOS"),
        ("dust", "NOS"),
        ("smoke", "NOS"),
        ("emission", "NOS"),
        // Animal related
        ("stray", "ANM"),
        ("dog", "ANM"),
        ("dogs", "ANM"),
        ("cattle", "ANM"),
        ("cow", "ANM"),
        ("cows", "ANM"),
        ("pig", "ANM"),
        ("pigs", "ANM"),
        ("animal", "ANM"),
        ("animals", "ANM"),
        ("carcass", "ANM"),
        ("snake", "ANM"),
        ("monkey", "ANM"),
        // Mosquito / health hazard
        ("mosquito", "MSQ"),
        ("mosquitoes", "MSQ"),
        ("dengue", "MSQ"),
        ("malaria", "MSQ"),
        ("breeding", "MSQ"),
        ("fogging", "MSQ"),
        ("fumigation", "MSQ"),
        // Building / structural
        ("building", "BLD"),
        ("illegal", "BLD"),
        ("demolition", "BLD"),
        ("unsafe", "BLD"),
        ("collapse", "BLD"),
        ("wall", "BLD"),
        ("crack", "BLD"),
        ("cracked", "BLD"),
    ];
    TABLE
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn default_department_codes() -> Vec<(String, String)> {
    const TABLE: &[(&str, &str)] = &[
        ("public works", "PWD"),
        ("solid waste management", "SWM"),
        ("water supply", "WSS"),
        ("sewerage", "SEW"),
        ("electricity", "ELE"),
        ("street lighting", "SLT"),
        ("roads", "RDS"),
        ("parks", "PRK"),
        ("health", "HLT"),
        ("sanitation", "SAN"),
        ("traffic", "TRF"),
        ("drainage", "DRN"),
        ("building", "BLD"),
        ("town planning", "TPL"),
        ("revenue", "REV"),
        ("education", "EDU"),
        ("fire", "FIR"),
        ("animal control", "ANM"),
        ("environment", "ENV"),
        ("transport", "TRN"),
    ];
    TABLE
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}
