use log::warn;
use odometer_core::{format::DistanceKm, store::DistanceStore};
use odometer_hal_esp32s3::storage::flash_distance::{FlashDistanceStore, FlashStoreError};

/// Distance store that may have failed to open.
///
/// An unopened store keeps answering with its open error, so the app treats
/// it like any other failing store: no prior value, saves dropped.
pub enum BootStore {
    Flash(FlashDistanceStore),
    Unavailable(FlashStoreError),
}

impl BootStore {
    pub fn open() -> Self {
        match FlashDistanceStore::new() {
            Ok(store) => Self::Flash(store),
            Err(err) => {
                warn!("store: flash unavailable err={:?}", err);
                Self::Unavailable(err)
            }
        }
    }
}

impl DistanceStore for BootStore {
    type Error = FlashStoreError;

    fn load(&mut self) -> Result<Option<DistanceKm>, Self::Error> {
        match self {
            Self::Flash(store) => store.load(),
            Self::Unavailable(err) => Err(*err),
        }
    }

    fn save(&mut self, distance: DistanceKm) -> Result<(), Self::Error> {
        match self {
            Self::Flash(store) => store.save(distance),
            Self::Unavailable(err) => Err(*err),
        }
    }
}
