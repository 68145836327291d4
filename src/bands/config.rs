use super::Band;

/// Default viewport partition, top to bottom. `B2` is the reading focus.
pub fn default_bands() -> Vec<Band> {
    vec![
        Band::new("B0", 0.0, 0.10),
        Band::new("B1", 0.10, 0.25),
        Band::new("B2", 0.25, 0.75),
        Band::new("B3", 0.75, 0.90),
        Band::new("B4", 0.90, 1.0),
    ]
}

/// Bands whose intersection counts as reading.
pub fn default_active_bands() -> Vec<String> {
    vec!["B2".to_string()]
}
