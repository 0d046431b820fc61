//! Closed vocabularies and the presentation assets they map to.
//!
//! Every table here is total over its vocabulary. A term outside the
//! vocabulary is reported as [`UnknownCodeError`] and never mapped to a
//! guessed asset.

use serde::{Serialize, Serializer};

use crate::error::UnknownCodeError;

/// Emoji and image used to present a weather description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DescriptionAsset {
    /// HTML character reference(s), e.g. `&#9748;`
    pub emoji: &'static str,
    /// Image asset id, e.g. `LightRain`
    pub image: &'static str,
}

impl DescriptionAsset {
    /// Path of the image under the static asset root.
    pub fn image_path(&self) -> String {
        format!("static/weatherimages/{}.jpg", self.image)
    }
}

/// Weather descriptions, in Met Office significant-weather order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherDescription {
    NotAvailable,
    ClearNight,
    SunnyDay,
    PartlyCloudyNight,
    PartlyCloudyDay,
    NotUsed,
    Mist,
    Fog,
    Cloudy,
    Overcast,
    LightRainShowerNight,
    LightRainShowerDay,
    Drizzle,
    LightRain,
    HeavyRainShowerNight,
    HeavyRainShowerDay,
    HeavyRain,
    SleetShowerNight,
    SleetShowerDay,
    Sleet,
    HailShowerNight,
    HailShowerDay,
    Hail,
    LightSnowShowerNight,
    LightSnowShowerDay,
    LightSnow,
    HeavySnowShowerNight,
    HeavySnowShowerDay,
    HeavySnow,
    ThunderShowerNight,
    ThunderShowerDay,
    Thunder,
}

impl WeatherDescription {
    pub const ALL: [WeatherDescription; 32] = [
        Self::NotAvailable,
        Self::ClearNight,
        Self::SunnyDay,
        Self::PartlyCloudyNight,
        Self::PartlyCloudyDay,
        Self::NotUsed,
        Self::Mist,
        Self::Fog,
        Self::Cloudy,
        Self::Overcast,
        Self::LightRainShowerNight,
        Self::LightRainShowerDay,
        Self::Drizzle,
        Self::LightRain,
        Self::HeavyRainShowerNight,
        Self::HeavyRainShowerDay,
        Self::HeavyRain,
        Self::SleetShowerNight,
        Self::SleetShowerDay,
        Self::Sleet,
        Self::HailShowerNight,
        Self::HailShowerDay,
        Self::Hail,
        Self::LightSnowShowerNight,
        Self::LightSnowShowerDay,
        Self::LightSnow,
        Self::HeavySnowShowerNight,
        Self::HeavySnowShowerDay,
        Self::HeavySnow,
        Self::ThunderShowerNight,
        Self::ThunderShowerDay,
        Self::Thunder,
    ];

    /// Resolve a description label as providers write it.
    pub fn resolve(label: &str) -> Result<Self, UnknownCodeError> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.label() == label)
            .ok_or_else(|| UnknownCodeError::new("weather description", label))
    }

    /// Translate a Met Office significant-weather code ("NA", "0".."30").
    pub fn from_significant_weather_code(code: &str) -> Result<Self, UnknownCodeError> {
        let code = code.trim();
        if code == "NA" {
            return Ok(Self::NotAvailable);
        }
        // Only canonical spellings: "01" or "+5" are not in the table
        code.parse::<usize>()
            .ok()
            .filter(|n| n.to_string() == code)
            .and_then(|n| Self::ALL.get(n + 1).copied())
            .ok_or_else(|| UnknownCodeError::new("significant weather", code))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotAvailable => "Not available",
            Self::ClearNight => "Clear night",
            Self::SunnyDay => "Sunny day",
            Self::PartlyCloudyNight => "Partly cloudy (night)",
            Self::PartlyCloudyDay => "Partly cloudy (day)",
            Self::NotUsed => "Not used",
            Self::Mist => "Mist",
            Self::Fog => "Fog",
            Self::Cloudy => "Cloudy",
            Self::Overcast => "Overcast",
            Self::LightRainShowerNight => "Light rain shower (night)",
            Self::LightRainShowerDay => "Light rain shower (day)",
            Self::Drizzle => "Drizzle",
            Self::LightRain => "Light rain",
            Self::HeavyRainShowerNight => "Heavy rain shower (night)",
            Self::HeavyRainShowerDay => "Heavy rain shower (day)",
            Self::HeavyRain => "Heavy rain",
            Self::SleetShowerNight => "Sleet shower (night)",
            Self::SleetShowerDay => "Sleet shower (day)",
            Self::Sleet => "Sleet",
            Self::HailShowerNight => "Hail shower (night)",
            Self::HailShowerDay => "Hail shower (day)",
            Self::Hail => "Hail",
            Self::LightSnowShowerNight => "Light snow shower (night)",
            Self::LightSnowShowerDay => "Light snow shower (day)",
            Self::LightSnow => "Light snow",
            Self::HeavySnowShowerNight => "Heavy snow shower (night)",
            Self::HeavySnowShowerDay => "Heavy snow shower (day)",
            Self::HeavySnow => "Heavy snow",
            Self::ThunderShowerNight => "Thunder shower (night)",
            Self::ThunderShowerDay => "Thunder shower (day)",
            Self::Thunder => "Thunder",
        }
    }

    pub fn asset(self) -> DescriptionAsset {
        let (emoji, image) = match self {
            Self::NotAvailable => ("&#10068;", "NotAvailable"),
            Self::ClearNight => ("&#127747;", "ClearNight"),
            Self::SunnyDay => ("&#127775;", "Sunny"),
            Self::PartlyCloudyNight => ("&#9729;", "CloudyNight"),
            Self::PartlyCloudyDay => ("&#9925;", "CloudyDay"),
            Self::NotUsed => ("&#10068;", "NotAvailable"),
            Self::Mist => ("&#127787;&#65039;", "Mist"),
            Self::Fog => ("&#127787;&#65039;", "Fog"),
            Self::Cloudy => ("&#9729;&#65039;", "Cloudy"),
            Self::Overcast => ("&#127745;", "Overcast"),
            Self::LightRainShowerNight => ("&#9748;", "LightRainShowerNight"),
            Self::LightRainShowerDay => ("&#9748;", "LightRainShowerDay"),
            Self::Drizzle => ("&#9748;", "Drizzle"),
            Self::LightRain => ("&#9748;", "LightRain"),
            Self::HeavyRainShowerNight => ("&#9748;", "HeavyRainShowerNight"),
            Self::HeavyRainShowerDay => ("&#9748;", "HeavyRainShowerDay"),
            Self::HeavyRain => ("&#9748;", "HeavyRain"),
            Self::SleetShowerNight => ("&#127784;&#65039;", "SleetShowerNight"),
            Self::SleetShowerDay => ("&#127784;&#65039;", "SleetShowerDay"),
            Self::Sleet => ("&#127784;&#65039;", "Sleet"),
            Self::HailShowerNight => ("&#127784;&#65039;", "HailShowerNight"),
            Self::HailShowerDay => ("&#127784;&#65039;", "HailShowerDay"),
            Self::Hail => ("&#127784;&#65039;", "Hail"),
            Self::LightSnowShowerNight => ("&#127784;&#65039;", "LightSnowShowerNight"),
            Self::LightSnowShowerDay => ("&#127784;&#65039;", "LightSnowShowerDay"),
            Self::LightSnow => ("&#9731;&#65039;", "LightSnow"),
            Self::HeavySnowShowerNight => ("&#9731;&#65039;", "HeavySnowShowerNight"),
            Self::HeavySnowShowerDay => ("&#9731;&#65039;", "HeavySnowShowerDay"),
            Self::HeavySnow => ("&#9731;&#65039;", "HeavySnow"),
            Self::ThunderShowerNight => ("&#127785;&#65039;", "ThunderShowerNight"),
            Self::ThunderShowerDay => ("&#127785;&#65039;", "ThunderShowerDay"),
            Self::Thunder => ("&#127785;&#65039;", "Thunder"),
        };
        DescriptionAsset { emoji, image }
    }
}

impl Serialize for WeatherDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Lunar phases as named by timeanddate.com.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    ThirdQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub const ALL: [MoonPhase; 8] = [
        Self::NewMoon,
        Self::WaxingCrescent,
        Self::FirstQuarter,
        Self::WaxingGibbous,
        Self::FullMoon,
        Self::WaningGibbous,
        Self::ThirdQuarter,
        Self::WaningCrescent,
    ];

    pub fn resolve(name: &str) -> Result<Self, UnknownCodeError> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .ok_or_else(|| UnknownCodeError::new("moon phase", name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NewMoon => "New Moon",
            Self::WaxingCrescent => "Waxing Crescent",
            Self::FirstQuarter => "First Quarter",
            Self::WaxingGibbous => "Waxing Gibbous",
            Self::FullMoon => "Full Moon",
            Self::WaningGibbous => "Waning Gibbous",
            Self::ThirdQuarter => "Third Quarter",
            Self::WaningCrescent => "Waning Crescent",
        }
    }

    /// HTML reference for the moon emoji (U+1F311 through U+1F318).
    pub fn emoji(self) -> &'static str {
        match self {
            Self::NewMoon => "&#127761;",
            Self::WaxingCrescent => "&#127762;",
            Self::FirstQuarter => "&#127763;",
            Self::WaxingGibbous => "&#127764;",
            Self::FullMoon => "&#127765;",
            Self::WaningGibbous => "&#127766;",
            Self::ThirdQuarter => "&#127767;",
            Self::WaningCrescent => "&#127768;",
        }
    }
}

impl Serialize for MoonPhase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Highest UV index with its own advisory; anything above shares it.
pub const UV_INDEX_MAX: u8 = 11;

const UV_LOW: &str = "Low exposure. No protection required. You can safely stay outside";
const UV_MODERATE: &str =
    "Moderate exposure. Seek shade during midday hours, cover up and wear sunscreen";
const UV_HIGH: &str = "High exposure. Seek shade during midday hours, cover up and wear sunscreen";
const UV_VERY_HIGH: &str =
    "Very high. Avoid being outside during midday hours. Shirt, sunscreen and hat are essential";
const UV_EXTREME: &str =
    "Extreme. Avoid being outside during midday hours. Shirt, sunscreen and hat essential.";

/// A UV index as the source reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UvIndex(u32);

impl UvIndex {
    /// Accepts whole, non-negative indices.
    pub fn resolve(code: f64) -> Result<Self, UnknownCodeError> {
        if !code.is_finite() || code < 0.0 || code.fract() != 0.0 || code > f64::from(u32::MAX) {
            return Err(UnknownCodeError::new("UV index", code.to_string()));
        }
        Ok(Self(code as u32))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Indices above 11 share the advisory for 11.
    pub fn advisory(self) -> &'static str {
        match self.0.min(u32::from(UV_INDEX_MAX)) {
            0..=2 => UV_LOW,
            3..=5 => UV_MODERATE,
            6..=7 => UV_HIGH,
            8..=10 => UV_VERY_HIGH,
            _ => UV_EXTREME,
        }
    }
}
