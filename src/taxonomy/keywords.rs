use super::Boundary::{self, Stem, Word};

// Academic, hospital and government markers.
pub const ACADEMIC: &[(&str, Boundary)] = &[
    ("universit", Stem),
    ("universidad", Stem),
    ("universidade", Stem),
    ("college", Stem),
    ("school", Stem),
    ("academy", Stem),
    ("academia", Stem),
    ("faculty", Stem),
    ("department", Stem),
    ("dept", Word),
    ("institut", Stem),
    ("laboratory", Word),
    ("hospital", Stem),
    ("hopital", Stem),
    ("hôpital", Stem),
    ("klinik", Stem),
    ("clinic", Word),
    ("clinics", Word),
    ("medical center", Word),
    ("medical centre", Word),
    ("health center", Word),
    ("health centre", Word),
    ("research center", Word),
    ("research centre", Word),
    ("ministry of health", Word),
    ("nhs", Word),
    ("public health", Word),
    ("government", Word),
    ("centers for disease control", Word),
];

// Corporate legal-form suffixes. These override academic markers.
pub const CORPORATE_SUFFIXES: &[(&str, Boundary)] = &[
    ("inc", Word),
    ("incorporated", Word),
    ("ltd", Word),
    ("limited", Word),
    ("llc", Word),
    ("gmbh", Word),
    ("corp", Word),
    ("corporation", Word),
    ("plc", Word),
    // Bare "co." also ends "Aurora, CO." and starts "Co. Kildare".
    ("co.,", Word),
    ("& co", Word),
    ("s.a.", Word),
    ("s.p.a.", Word),
    ("b.v.", Word),
    ("pty", Word),
];

// Well-known pharmaceutical and biotech companies. These override academic
// markers as well.
pub const KNOWN_COMPANIES: &[(&str, Boundary)] = &[
    ("pfizer", Word),
    ("merck", Word),
    ("msd", Word),
    ("novartis", Word),
    ("roche", Word),
    ("genentech", Word),
    ("johnson & johnson", Word),
    ("j&j", Word),
    ("janssen", Word),
    ("sanofi", Word),
    ("glaxosmithkline", Word),
    ("gsk", Word),
    ("astrazeneca", Word),
    ("gilead", Word),
    ("amgen", Word),
    ("abbvie", Word),
    ("eli lilly", Word),
    ("lilly", Word),
    ("bristol-myers squibb", Word),
    ("bristol myers squibb", Word),
    ("boehringer", Word),
    ("moderna", Word),
    ("biogen", Word),
    ("regeneron", Word),
    ("bayer", Word),
    ("novo nordisk", Word),
    ("takeda", Word),
    ("astellas", Word),
    ("daiichi sankyo", Word),
    ("eisai", Word),
    ("celgene", Word),
    ("alexion", Word),
    ("incyte", Word),
    ("biomarin", Word),
    ("alkermes", Word),
    ("ionis", Word),
    ("illumina", Word),
    ("10x genomics", Word),
];

// Industry vocabulary. Weaker than the two lists above: an academic marker
// in the same text wins ("Department of Pharmaceutical Sciences").
pub const INDUSTRY: &[(&str, Boundary)] = &[
    ("pharma", Word),
    ("pharmaceutic", Stem),
    ("biopharm", Stem),
    ("biotech", Stem),
    ("therapeutics", Word),
    ("bioscience", Stem),
    ("biologics", Word),
    ("laboratories", Word),
    ("labs", Word),
    ("genomics", Word),
    ("diagnostics", Word),
    ("company", Word),
];

/// Domain endings that mark an academic, government or non-profit address.
/// `.org` is ambiguous but leans academic.
pub const ACADEMIC_EMAIL_SUFFIXES: &[&str] = &[
    ".edu", ".gov", ".mil", ".org", ".int", "nhs.uk", "nhs.net",
];

/// Domain fragments that mark academic addresses under country TLDs
/// (`ox.ac.uk`, `pku.edu.cn`, `nih.gov.au`).
pub const ACADEMIC_EMAIL_INFIXES: &[&str] = &[".ac.", ".edu.", ".gov."];

/// Personal mailbox providers say nothing about an employer.
pub const PERSONAL_MAIL_PROVIDERS: &[&str] = &[
    "gmail",
    "googlemail",
    "yahoo",
    "hotmail",
    "outlook",
    "live",
    "msn",
    "icloud",
    "me",
    "aol",
    "protonmail",
    "proton",
    "qq",
    "163",
    "126",
    "foxmail",
    "yandex",
    "gmx",
    "naver",
    "hanmail",
];
