use serde::Serialize;

/// Experience ranges accepted by the estimated-salary endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceBucket {
    #[default]
    All,
    LessThanOne,
    OneToThree,
    FourToSix,
    SevenToNine,
    TenToFourteen,
    AboveFifteen,
}

impl ExperienceBucket {
    pub const ALL_BUCKETS: [ExperienceBucket; 7] = [
        ExperienceBucket::All,
        ExperienceBucket::LessThanOne,
        ExperienceBucket::OneToThree,
        ExperienceBucket::FourToSix,
        ExperienceBucket::SevenToNine,
        ExperienceBucket::TenToFourteen,
        ExperienceBucket::AboveFifteen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceBucket::All => "ALL",
            ExperienceBucket::LessThanOne => "LESS_THAN_ONE",
            ExperienceBucket::OneToThree => "ONE_TO_THREE",
            ExperienceBucket::FourToSix => "FOUR_TO_SIX",
            ExperienceBucket::SevenToNine => "SEVEN_TO_NINE",
            ExperienceBucket::TenToFourteen => "TEN_TO_FOURTEEN",
            ExperienceBucket::AboveFifteen => "ABOVE_FIFTEEN",
        }
    }

    /// Case-insensitive lookup. Anything outside the vocabulary becomes `All`.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        Self::ALL_BUCKETS
            .into_iter()
            .find(|bucket| bucket.as_str().eq_ignore_ascii_case(token))
            .unwrap_or_default()
    }
}
