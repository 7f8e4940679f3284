//! Search query representation.

use serde::{Deserialize, Serialize};

use crate::{Result, SearchError};

/// Default region code ("no region").
pub const DEFAULT_REGION: &str = "wt-wt";

/// Safe search level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    /// Strict filtering.
    On,
    /// Moderate filtering.
    #[default]
    Moderate,
    /// No filtering.
    Off,
}

impl std::str::FromStr for SafeSearch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "moderate" => Ok(Self::Moderate),
            "off" => Ok(Self::Off),
            other => Err(format!("unknown safesearch level: {}", other)),
        }
    }
}

/// Time limit filter for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeLimit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeLimit {
    /// Single-letter code used by the text endpoint's `df` field.
    pub fn code(self) -> &'static str {
        match self {
            Self::Day => "d",
            Self::Week => "w",
            Self::Month => "m",
            Self::Year => "y",
        }
    }

    /// Name used in the image endpoint's filter field.
    pub fn image_name(self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }
}

/// Defines a filter enum whose variants map to fixed wire strings.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Value sent to the backend.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($wire) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("unknown {} value: {}", stringify!($name), s))
            }
        }
    };
}

wire_enum! {
    /// Image size filter.
    ImageSize { Small => "Small", Medium => "Medium", Large => "Large", Wallpaper => "Wallpaper" }
}

wire_enum! {
    /// Image color filter.
    ImageColor {
        Color => "color",
        Monochrome => "Monochrome",
        Red => "Red",
        Orange => "Orange",
        Yellow => "Yellow",
        Green => "Green",
        Blue => "Blue",
        Purple => "Purple",
        Pink => "Pink",
        Brown => "Brown",
        Black => "Black",
        Gray => "Gray",
        Teal => "Teal",
        White => "White",
    }
}

wire_enum! {
    /// Image type filter.
    ImageType { Photo => "photo", Clipart => "clipart", Gif => "gif", Transparent => "transparent", Line => "line" }
}

wire_enum! {
    /// Image layout filter.
    ImageLayout { Square => "Square", Tall => "Tall", Wide => "Wide" }
}

wire_enum! {
    /// Image license filter.
    ImageLicense {
        Any => "any",
        Public => "Public",
        Share => "Share",
        ShareCommercially => "ShareCommercially",
        Modify => "Modify",
        ModifyCommercially => "ModifyCommercially",
    }
}

/// Filters that only apply to image search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFilters {
    pub size: Option<ImageSize>,
    pub color: Option<ImageColor>,
    pub image_type: Option<ImageType>,
    pub layout: Option<ImageLayout>,
    pub license: Option<ImageLicense>,
}

/// A search query with all parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search terms.
    pub keywords: String,
    /// Region code (e.g., "us-en"); "wt-wt" means no region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Safe search level.
    #[serde(default)]
    pub safesearch: SafeSearch,
    /// Time limit filter.
    #[serde(default)]
    pub timelimit: Option<TimeLimit>,
    /// Image-only filters; ignored by text search.
    #[serde(default)]
    pub filters: ImageFilters,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl SearchQuery {
    /// Creates a new search query with the given keywords.
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            region: default_region(),
            safesearch: SafeSearch::default(),
            timelimit: None,
            filters: ImageFilters::default(),
        }
    }

    /// Sets the region code.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the safe search level.
    pub fn with_safesearch(mut self, level: SafeSearch) -> Self {
        self.safesearch = level;
        self
    }

    /// Sets the time limit filter.
    pub fn with_timelimit(mut self, limit: TimeLimit) -> Self {
        self.timelimit = Some(limit);
        self
    }

    /// Sets the image filters.
    pub fn with_filters(mut self, filters: ImageFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Rejects empty keywords.
    pub fn validate(&self) -> Result<()> {
        if self.keywords.trim().is_empty() {
            return Err(SearchError::MissingKeywords);
        }
        Ok(())
    }
}
