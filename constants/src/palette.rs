pub struct PaletteInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// Linear RGB
    pub rgb: [f32; 3],
}

pub const DEFAULT_COLOR_ID: &str = "pearl";

pub const PRODUCT_PALETTE: &[PaletteInfo] = &[
    PaletteInfo {
        id: "pearl",
        name: "Pearl White",
        rgb: [0.82, 0.81, 0.78],
    },
    PaletteInfo {
        id: "graphite",
        name: "Graphite",
        rgb: [0.035, 0.038, 0.045],
    },
    PaletteInfo {
        id: "coral",
        name: "Coral",
        rgb: [0.9, 0.22, 0.16],
    },
    PaletteInfo {
        id: "lagoon",
        name: "Lagoon",
        rgb: [0.02, 0.36, 0.42],
    },
    PaletteInfo {
        id: "sage",
        name: "Sage",
        rgb: [0.28, 0.4, 0.26],
    },
];
