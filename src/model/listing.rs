//! Code listings with tagged regions
//!
//! A listing is the source text shown inside a stack frame. Trace points
//! refer to pieces of it by tag, written inline as `[[tag|text]]`:
//!
//! ```text
//! def fact(n):
//!     if [[test|n == 0]]:
//!         [[base|return 1]]
//! ```
//!
//! Parsing strips the markup and records each region's line, column and
//! width in characters. Regions never span lines.

/// A tagged span of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub tag: String,
    pub line: usize,
    pub column: usize,
    pub width: usize,
}

/// Plain listing text plus the regions tagged in it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    lines: Vec<String>,
    regions: Vec<Region>,
}

impl Listing {
    /// Parse a listing, stripping `[[tag|text]]` markup
    pub fn parse(source: &str) -> Self {
        let mut regions = Vec::new();
        let lines = source
            .lines()
            .enumerate()
            .map(|(line, raw)| parse_line(raw, line, &mut regions))
            .collect();
        Listing { lines, regions }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Indices of every region carrying `tag`
    pub fn matching(&self, tag: &str) -> Vec<usize> {
        self.regions
            .iter()
            .enumerate()
            .filter(|(_, region)| region.tag == tag)
            .map(|(index, _)| index)
            .collect()
    }

    /// Width of the longest line in characters
    pub fn max_width(&self) -> usize {
        self.lines
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
    }
}

fn parse_line(raw: &str, line: usize, regions: &mut Vec<Region>) -> String {
    let mut plain = String::new();
    let mut rest = raw;

    while let Some(open) = rest.find("[[") {
        let after = &rest[open + 2..];
        let (Some(bar), Some(close)) = (after.find('|'), after.find("]]")) else {
            break;
        };
        if bar > close {
            // "[[" without a tag separator before the closing "]]": literal text
            plain.push_str(&rest[..open + 2]);
            rest = after;
            continue;
        }

        plain.push_str(&rest[..open]);
        let text = &after[bar + 1..close];
        regions.push(Region {
            tag: after[..bar].trim().to_string(),
            line,
            column: plain.chars().count(),
            width: text.chars().count(),
        });
        plain.push_str(text);
        rest = &after[close + 2..];
    }

    plain.push_str(rest);
    plain
}
