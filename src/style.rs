/// Visual roles used in rendered output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum Style {
    Info,
    Warn,
    Label,
    Key,
    Time,
    Suffix,
    Reset,
}

const ANSI: &[&str; 7] = &[
    "\x1b[1;34m", // Info
    "\x1b[1;31m", // Warn
    "\x1b[1m",    // Label
    "\x1b[36m",   // Key
    "\x1b[33m",   // Time
    "\x1b[1;35m", // Suffix
    "\x1b[0m",    // Reset
];

const PLAIN: &[&str; 7] = &[""; 7];

/// Maps [`Style`] roles to escape sequences. A plain palette maps
/// every role to the empty string.
#[derive(Clone, Copy, Debug)]
pub struct Palette(&'static [&'static str; 7]);

impl Palette {
    pub fn new(color: bool) -> Self {
        if color {
            Palette(ANSI)
        } else {
            Palette(PLAIN)
        }
    }

    #[inline(always)]
    pub fn get(&self, style: Style) -> &'static str {
        self.0[style as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn palettes() {
        let p = Palette::new(false);
        for s in [Style::Info, Style::Warn, Style::Label, Style::Reset] {
            assert_eq!(p.get(s), "");
        }
        let p = Palette::new(true);
        assert_eq!(p.get(Style::Reset), "\x1b[0m");
        assert_eq!(p.get(Style::Warn), "\x1b[1;31m");
    }
}
