//! Logical-to-physical LED addressing
//!
//! A matrix is usually one long LED chain folded into rows or columns. The
//! addressing scheme maps a logical (x, y) coordinate, with (0, 0) at the
//! top left, to the position of that LED along the chain.

/// Wiring pattern of the LED chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Addressing {
    /// Every row runs left to right
    RowMajor,
    /// Even rows run left to right, odd rows right to left
    #[default]
    SerpentineRows,
    /// Every column runs top to bottom
    ColumnMajor,
    /// Even columns run top to bottom, odd columns bottom to top
    SerpentineColumns,
}

impl Addressing {
    /// Physical LED index of logical (x, y)
    ///
    /// Callers must keep `x < width` and `y < height`.
    pub fn index(self, x: u16, y: u16, width: u16, height: u16) -> usize {
        let (x, y) = (x as usize, y as usize);
        let (width, height) = (width as usize, height as usize);

        match self {
            Addressing::RowMajor => y * width + x,
            Addressing::SerpentineRows => {
                if y % 2 == 0 {
                    y * width + x
                } else {
                    y * width + (width - 1 - x)
                }
            }
            Addressing::ColumnMajor => x * height + y,
            Addressing::SerpentineColumns => {
                if x % 2 == 0 {
                    x * height + y
                } else {
                    x * height + (height - 1 - y)
                }
            }
        }
    }

    /// Parse a scheme name as used in `matrix.toml` (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|&(_, scheme)| scheme)
    }
}

/// Accepted scheme names, including aliases
const NAMES: [(&str, Addressing); 7] = [
    ("row_major", Addressing::RowMajor),
    ("linear", Addressing::RowMajor),
    ("serpentine_rows", Addressing::SerpentineRows),
    ("serpentine", Addressing::SerpentineRows),
    ("zigzag", Addressing::SerpentineRows),
    ("column_major", Addressing::ColumnMajor),
    ("serpentine_columns", Addressing::SerpentineColumns),
];
