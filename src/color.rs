use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An opaque 8-bit sRGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    pub fn r(self) -> u8 {
        self.0[0]
    }

    pub fn g(self) -> u8 {
        self.0[1]
    }

    pub fn b(self) -> u8 {
        self.0[2]
    }

    /// Squared Euclidean distance between two colors, treating each channel as an axis.
    pub fn distance_squared(self, other: Rgb) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| {
                let d = i32::from(a) - i32::from(b);
                (d * d) as u32
            })
            .sum()
    }

    pub fn distance(self, other: Rgb) -> f64 {
        f64::from(self.distance_squared(other)).sqrt()
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(px: image::Rgb<u8>) -> Self {
        Rgb(px.0)
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(color: Rgb) -> Self {
        image::Rgb(color.0)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Parses `rrggbb` or `#rrggbb`. Shorthand (`#rgb`) and alpha forms are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let mut bytes = [0u8; 3];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| Error::InvalidColor {
            input: s.to_owned(),
        })?;
        Ok(Rgb(bytes))
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        let mut buf = [0u8; 6];
        hex::encode_to_slice(self.0, &mut buf).map_err(|_| fmt::Error)?;
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#ff0000".parse::<Rgb>().unwrap(), Rgb::new(255, 0, 0));
        assert_eq!("00c800".parse::<Rgb>().unwrap(), Rgb::new(0, 200, 0));
        assert_eq!("#A0b0C0".parse::<Rgb>().unwrap(), Rgb::new(0xa0, 0xb0, 0xc0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "#", "#fff", "#ff00000", "#ff00zz", "ff 000", "##ff0000"] {
            match input.parse::<Rgb>() {
                Err(Error::InvalidColor { input: got }) => assert_eq!(got, input),
                other => panic!("{:?}: expected InvalidColor, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_display_round_trips_through_serde() {
        let color = Rgb::new(0x12, 0xab, 0x00);
        assert_eq!(color.to_string(), "#12ab00");
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#12ab00\"");
        assert_eq!(serde_json::from_str::<Rgb>(&json).unwrap(), color);
        assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
    }

    #[test]
    fn test_distance() {
        let a = Rgb::new(10, 20, 30);
        assert_eq!(a.distance_squared(a), 0);
        assert_eq!(a.distance_squared(Rgb::new(13, 24, 30)), 25);
        assert_eq!(a.distance(Rgb::new(13, 24, 30)), 5.0);
        assert_eq!(Rgb::BLACK.distance_squared(Rgb::new(255, 255, 255)), 3 * 255 * 255);
    }
}
