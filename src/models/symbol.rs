use super::BitMatrix;

/// Error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ECLevel {
    /// Low (~7% recovery capacity)
    L,
    /// Medium (~15% recovery capacity)
    M,
    /// Quartile (~25% recovery capacity)
    Q,
    /// High (~30% recovery capacity)
    H,
}

impl ECLevel {
    /// Two-bit encoding used in the format-info field (L=01, M=00, Q=11, H=10)
    pub fn format_bits(self) -> u8 {
        match self {
            ECLevel::L => 1,
            ECLevel::M => 0,
            ECLevel::Q => 3,
            ECLevel::H => 2,
        }
    }

    /// Inverse of `format_bits`
    pub fn from_format_bits(bits: u8) -> Option<Self> {
        match bits & 0x03 {
            0 => Some(ECLevel::M),
            1 => Some(ECLevel::L),
            2 => Some(ECLevel::H),
            3 => Some(ECLevel::Q),
            _ => None,
        }
    }

    /// Row index into the per-version capacity tables
    pub(crate) fn table_index(self) -> usize {
        match self {
            ECLevel::L => 0,
            ECLevel::M => 1,
            ECLevel::Q => 2,
            ECLevel::H => 3,
        }
    }
}

/// Data mask pattern (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskPattern(u8);

impl MaskPattern {
    /// Create from a pattern index in 0..8
    pub fn new(index: u8) -> Option<Self> {
        (index < 8).then_some(Self(index))
    }

    /// Pattern index in 0..8
    pub fn index(self) -> u8 {
        self.0
    }

    /// Whether the module at (row, col) is inverted by this pattern
    pub fn is_masked(self, row: usize, col: usize) -> bool {
        let (r, c) = (row, col);
        match self.0 {
            0 => (r + c) % 2 == 0,
            1 => r % 2 == 0,
            2 => c % 3 == 0,
            3 => (r + c) % 3 == 0,
            4 => (r / 2 + c / 3) % 2 == 0,
            5 => (r * c) % 2 + (r * c) % 3 == 0,
            6 => ((r * c) % 2 + (r * c) % 3) % 2 == 0,
            7 => ((r + c) % 2 + (r * c) % 3) % 2 == 0,
            _ => unreachable!(),
        }
    }
}

/// Segment data mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Decimal digits, 3 per 10 bits
    Numeric,
    /// The 45-character alphanumeric set, 2 per 11 bits
    Alphanumeric,
    /// Raw bytes, 8 bits each
    EightBit,
}

impl Mode {
    /// Four-bit mode indicator
    pub fn indicator(self) -> u8 {
        match self {
            Mode::Numeric => 1,
            Mode::Alphanumeric => 2,
            Mode::EightBit => 4,
        }
    }

    /// Inverse of `indicator`
    pub fn from_indicator(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Mode::Numeric),
            2 => Some(Mode::Alphanumeric),
            4 => Some(Mode::EightBit),
            _ => None,
        }
    }

    /// Width of the character-count indicator for this mode at `version`
    pub fn char_count_bits(self, version: u8) -> usize {
        let band = match version {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match self {
            Mode::Numeric => [10, 12, 14][band],
            Mode::Alphanumeric => [9, 11, 13][band],
            Mode::EightBit => [8, 16, 16][band],
        }
    }
}

/// An encoded QR symbol: the module matrix plus the parameters chosen
/// during encoding.
#[derive(Debug, Clone)]
pub struct Symbol {
    matrix: BitMatrix,
    version: u8,
    ec_level: ECLevel,
    mask: MaskPattern,
}

impl Symbol {
    pub(crate) fn new(matrix: BitMatrix, version: u8, ec_level: ECLevel, mask: MaskPattern) -> Self {
        Self {
            matrix,
            version,
            ec_level,
            mask,
        }
    }

    /// Side length in modules (17 + 4*version)
    pub fn size(&self) -> usize {
        self.matrix.width()
    }

    /// Symbol version in 1..=40
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Error correction level
    pub fn ec_level(&self) -> ECLevel {
        self.ec_level
    }

    /// Mask pattern selected by penalty scoring
    pub fn mask(&self) -> MaskPattern {
        self.mask
    }

    /// Module color at (x, y); true = dark. Out of bounds reads light.
    pub fn module(&self, x: usize, y: usize) -> bool {
        self.matrix.get(x, y)
    }

    /// Borrow the module matrix
    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    /// Rasterize to an RGBA buffer at `scale` pixels per module with a
    /// `quiet_zone` border (in modules). Returns (pixels, width, height).
    ///
    /// This is the minimal escape hatch shared by the CLI and the tests;
    /// anything fancier belongs outside the core.
    pub fn to_rgba(&self, scale: usize, quiet_zone: usize) -> (Vec<u8>, usize, usize) {
        let n = self.size();
        let side = (n + 2 * quiet_zone) * scale;
        let mut pixels = vec![255u8; side * side * 4];
        for y in 0..n {
            for x in 0..n {
                if !self.matrix.get(x, y) {
                    continue;
                }
                let px0 = (x + quiet_zone) * scale;
                let py0 = (y + quiet_zone) * scale;
                for py in py0..py0 + scale {
                    for px in px0..px0 + scale {
                        let idx = (py * side + px) * 4;
                        pixels[idx] = 0;
                        pixels[idx + 1] = 0;
                        pixels[idx + 2] = 0;
                    }
                }
            }
        }
        (pixels, side, side)
    }
}

/// Everything `decode` recovers from an image: the payload plus the symbol
/// parameters and advisory quality grades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult {
    /// Decoded payload as UTF-8 text (lossy for non-UTF-8 byte payloads)
    pub text: String,
    /// Raw decoded bytes
    pub data: Vec<u8>,
    /// Symbol version in 1..=40
    pub version: u8,
    /// Error correction level read from format info
    pub ec_level: ECLevel,
    /// Mask pattern read from format info
    pub mask: MaskPattern,
    /// 0..=4; how cleanly the function patterns sampled (4 = ideal)
    pub functional_grade: u8,
    /// 0..=4; margin left in the Reed-Solomon budget (4 = no errors)
    pub error_grade: u8,
    /// Codeword errors corrected in each block, in block order
    pub per_block_errors: Vec<usize>,
}
