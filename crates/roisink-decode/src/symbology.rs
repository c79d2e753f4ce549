use rxing::BarcodeFormat;

/// The symbologies the decoder pool is configured for at startup
/// (spec.md §4.6). `Industrial2of5` has no dedicated ZXing/rxing format —
/// it is mapped onto `ITF`, the closest supported interleaved variant
/// (documented in the design ledger as a known approximation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    Qr,
    Code39,
    Code93,
    Code128,
    Codabar,
    Itf,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Industrial2of5,
}

impl Symbology {
    /// All symbologies spec.md §4.6 names, in the order listed there.
    pub const ALL: [Symbology; 11] = [
        Symbology::Qr,
        Symbology::Code39,
        Symbology::Code93,
        Symbology::Code128,
        Symbology::Codabar,
        Symbology::Itf,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::Industrial2of5,
    ];

    #[must_use]
    pub fn to_barcode_format(self) -> BarcodeFormat {
        match self {
            Symbology::Qr => BarcodeFormat::QR_CODE,
            Symbology::Code39 => BarcodeFormat::CODE_39,
            Symbology::Code93 => BarcodeFormat::CODE_93,
            Symbology::Code128 => BarcodeFormat::CODE_128,
            Symbology::Codabar => BarcodeFormat::CODABAR,
            Symbology::Itf | Symbology::Industrial2of5 => BarcodeFormat::ITF,
            Symbology::Ean13 => BarcodeFormat::EAN_13,
            Symbology::Ean8 => BarcodeFormat::EAN_8,
            Symbology::UpcA => BarcodeFormat::UPC_A,
            Symbology::UpcE => BarcodeFormat::UPC_E,
        }
    }
}
