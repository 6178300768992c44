/// Icon bucket for a free-text condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConditionIcon {
    Clear,
    Cloudy,
    Rainy,
    Snowy,
    /// Nothing matched. Drawn like `Clear`.
    #[default]
    Default,
}

// Checked in this order, first hit wins. "rain and fog" is Cloudy.
const BUCKETS: &[(ConditionIcon, &[&str])] = &[
    (ConditionIcon::Clear, &["clear", "sunny"]),
    (ConditionIcon::Cloudy, &["cloud", "overcast", "mist", "fog"]),
    (ConditionIcon::Rainy, &["rain", "drizzle", "shower"]),
    (ConditionIcon::Snowy, &["snow", "blizzard"]),
];

impl ConditionIcon {
    pub fn from_condition(text: &str) -> Self {
        let lower = text.to_lowercase();

        BUCKETS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(icon, _)| *icon)
            .unwrap_or_default()
    }

    /// Name of the image asset for this bucket.
    pub fn asset_name(&self) -> &'static str {
        match self {
            ConditionIcon::Clear | ConditionIcon::Default => "weather",
            ConditionIcon::Cloudy => "cloudy",
            ConditionIcon::Rainy => "rainy",
            ConditionIcon::Snowy => "frost",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionIcon::Clear => "clear",
            ConditionIcon::Cloudy => "cloudy",
            ConditionIcon::Rainy => "rainy",
            ConditionIcon::Snowy => "snowy",
            ConditionIcon::Default => "default",
        }
    }
}

impl std::fmt::Display for ConditionIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
