//! Representative part specs with known envelopes.

use part_engine::{
    BaseplateSpec, BinSpec, ChestSpec, ComponentSpec, DrawerSpec, ItemHolderSpec, LidSpec,
    TraySpec,
};

/// A named part and, where it is fixed by the grid, its outer size.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub name: &'static str,
    pub spec: ComponentSpec,
    pub envelope: Option<[f64; 3]>,
}

impl Fixture {
    fn new(name: &'static str, spec: impl Into<ComponentSpec>, envelope: Option<[f64; 3]>) -> Self {
        Self {
            name,
            spec: spec.into(),
            envelope,
        }
    }
}

/// One or more fixtures for every part kind.
pub fn catalogue() -> Vec<Fixture> {
    let mut holes = BinSpec::new(2, 2, 3);
    holes.holes = true;

    let mut divided = BinSpec::new(3, 2, 4);
    divided.length_div = 2;
    divided.width_div = 1;
    divided.scoops = true;

    let mut plate = BaseplateSpec::new(2, 2);
    plate.magnet_holes = true;
    plate.screw_holes = true;
    plate.countersink = true;

    vec![
        Fixture::new("plain bin", BinSpec::new(2, 2, 3), Some([83.5, 83.5, 24.8])),
        Fixture::new("bin with holes", holes, Some([83.5, 83.5, 24.8])),
        Fixture::new("divided bin", divided, Some([125.5, 83.5, 31.8])),
        Fixture::new("baseplate", BaseplateSpec::new(4, 3), Some([168.0, 126.0, 4.75])),
        Fixture::new("magnet baseplate", plate, Some([84.0, 84.0, 8.75])),
        Fixture::new("flat lid", LidSpec::new(2, 2), Some([83.5, 83.5, 7.8])),
        Fixture::new("stackable lid", LidSpec::new(2, 1).stackable(), Some([83.5, 41.5, 12.55])),
        Fixture::new("drawer", DrawerSpec::new(2, 1, 3), Some([93.18, 45.2, 22.2])),
        Fixture::new("chest", ChestSpec::new(2, 1, 3, 3), None),
        Fixture::new("tray", TraySpec::new(3, 2, 2).with_dividers(2, 0), Some([125.5, 83.5, 17.8])),
        Fixture::new(
            "battery holder",
            ComponentSpec::item_holder(ItemHolderSpec::preset(BinSpec::new(2, 2, 6), "AA")),
            Some([83.5, 83.5, 45.8]),
        ),
    ]
}

/// Fixture by name.
pub fn fixture(name: &str) -> Option<Fixture> {
    catalogue().into_iter().find(|f| f.name == name)
}
