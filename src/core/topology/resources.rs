//! Font and DPI hints from the platform resource database.
//!
//! The database is newline separated `name:\tvalue` text. Only the `Xft.*`
//! keys that affect screen metrics and font rendering are kept.

/// Font hinting strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintStyle {
    None,
    Slight,
    Medium,
    Full,
}

/// Subpixel layout for antialiased text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubpixelType {
    None,
    Rgb,
    Bgr,
    Vrgb,
    Vbgr,
}

/// Parsed resource database values. `None` means "not specified".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XResources {
    pub forced_dpi: Option<u32>,
    pub antialiasing: Option<bool>,
    pub hinting: Option<bool>,
    pub hint_style: Option<HintStyle>,
    pub subpixel: Option<SubpixelType>,
}

impl XResources {
    pub fn parse(database: &str) -> Self {
        let mut resources = Self::default();
        for line in database.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Xft.dpi" => {
                    // Non-positive values mean "use the physical DPI".
                    if let Some(dpi) = parse_int(value) {
                        resources.forced_dpi = u32::try_from(dpi).ok().filter(|&dpi| dpi > 0);
                    }
                }
                "Xft.antialias" => {
                    if let Some(flag) = parse_int(value) {
                        resources.antialiasing = Some(flag != 0);
                    }
                }
                "Xft.hinting" => {
                    if let Some(flag) = parse_int(value) {
                        resources.hinting = Some(flag != 0);
                    }
                }
                "Xft.hintstyle" => resources.hint_style = parse_hint_style(value),
                "Xft.rgba" => resources.subpixel = parse_rgba(value),
                _ => {}
            }
        }
        resources
    }
}

/// Integers are accepted with a fractional part (`96.0`), which is dropped.
fn parse_int(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|v| v as i64))
}

fn parse_hint_style(value: &str) -> Option<HintStyle> {
    match value {
        "hintnone" => Some(HintStyle::None),
        "hintslight" => Some(HintStyle::Slight),
        "hintmedium" => Some(HintStyle::Medium),
        "hintfull" => Some(HintStyle::Full),
        _ => None,
    }
}

fn parse_rgba(value: &str) -> Option<SubpixelType> {
    match value {
        "none" => Some(SubpixelType::None),
        "rgb" => Some(SubpixelType::Rgb),
        "bgr" => Some(SubpixelType::Bgr),
        "vrgb" => Some(SubpixelType::Vrgb),
        "vbgr" => Some(SubpixelType::Vbgr),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_database() {
        let db = "Xft.dpi:\t144\nXft.antialias:\t1\nXft.hinting:\t0\nXft.hintstyle:\thintslight\nXft.rgba:\trgb\nXcursor.size:\t24\n";
        let resources = XResources::parse(db);
        assert_eq!(resources.forced_dpi, Some(144));
        assert_eq!(resources.antialiasing, Some(true));
        assert_eq!(resources.hinting, Some(false));
        assert_eq!(resources.hint_style, Some(HintStyle::Slight));
        assert_eq!(resources.subpixel, Some(SubpixelType::Rgb));
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let resources = XResources::parse("Xft.dpi:\t-1\nXft.hintstyle:\tbogus\ngarbage line\nXft.dpi:\tabc");
        assert_eq!(resources, XResources::default());
        assert_eq!(XResources::parse("Xft.dpi: 96.0").forced_dpi, Some(96));
    }
}
