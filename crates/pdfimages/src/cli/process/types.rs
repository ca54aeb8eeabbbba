//! Value types parsed from command-line flags.

use std::fmt;
use std::str::FromStr;

use pdfimages_core::OutputFormat;

/// A size bound given to `--min-size` / `--max-size`.
///
/// `800x600` bounds pixel dimensions; anything else is a byte count with an
/// optional `B`, `KB`, `MB` or `GB` suffix (1024-based, case-insensitive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeBound {
    Bytes(u64),
    Dimensions { width: u32, height: u32 },
}

impl FromStr for SizeBound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("size must not be empty".to_string());
        }

        if let Some((w, h)) = s.split_once(['x', 'X']) {
            let width = w
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid width in '{s}' (expected WIDTHxHEIGHT)"))?;
            let height = h
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid height in '{s}' (expected WIDTHxHEIGHT)"))?;
            return Ok(Self::Dimensions { width, height });
        }

        parse_bytes(s).map(Self::Bytes)
    }
}

impl fmt::Display for SizeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(n) => write!(f, "{n}B"),
            Self::Dimensions { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

fn parse_bytes(s: &str) -> Result<u64, String> {
    let upper = s.to_ascii_uppercase();
    let split = upper
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(upper.len());
    let (number, unit) = upper.split_at(split);

    let multiplier: u64 = match unit.trim() {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        other => return Err(format!("unknown size unit '{other}' (use B, KB, MB or GB)")),
    };

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid size '{s}' (expected e.g. 500KB or 800x600)"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("invalid size '{s}'"));
    }
    Ok((value * multiplier as f64).round() as u64)
}

/// Value parser for `--format`.
pub fn parse_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(s).ok_or_else(|| {
        format!("unsupported image format '{s}' (expected png, jpg, jpeg, tiff or bmp)")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_bytes() {
        assert_eq!("2048".parse::<SizeBound>(), Ok(SizeBound::Bytes(2048)));
        assert_eq!("10b".parse::<SizeBound>(), Ok(SizeBound::Bytes(10)));
    }

    #[test]
    fn test_byte_units_are_binary() {
        assert_eq!("500KB".parse::<SizeBound>(), Ok(SizeBound::Bytes(500 * 1024)));
        assert_eq!("2mb".parse::<SizeBound>(), Ok(SizeBound::Bytes(2 * 1024 * 1024)));
        assert_eq!("1G".parse::<SizeBound>(), Ok(SizeBound::Bytes(1 << 30)));
        assert_eq!("1.5KB".parse::<SizeBound>(), Ok(SizeBound::Bytes(1536)));
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(
            "800x600".parse::<SizeBound>(),
            Ok(SizeBound::Dimensions {
                width: 800,
                height: 600
            })
        );
        assert_eq!(
            "64X32".parse::<SizeBound>(),
            Ok(SizeBound::Dimensions {
                width: 64,
                height: 32
            })
        );
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "abc", "10TB", "x600", "800x", "-5", "1.2.3MB"] {
            assert!(bad.parse::<SizeBound>().is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(SizeBound::Bytes(12).to_string(), "12B");
        assert_eq!(
            SizeBound::Dimensions {
                width: 3,
                height: 4
            }
            .to_string(),
            "3x4"
        );
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(parse_format("JPG"), Ok(OutputFormat::Jpg));
        assert_eq!(parse_format("tif"), Ok(OutputFormat::Tiff));
        assert!(parse_format("webp").unwrap_err().contains("webp"));
    }
}
