use std::sync::{Condvar, Mutex};

use dispatch_core::matrix::{
    MatrixError, MatrixProvider, ModeMetric, TableMatrixProvider, TravelMode, UnitSystem,
};
use h3o::LatLng;

fn key(point: LatLng) -> (i64, i64) {
    (
        (point.lat() * 1e6).round() as i64,
        (point.lng() * 1e6).round() as i64,
    )
}

/// Wraps a [`TableMatrixProvider`] and blocks any lookup against the held
/// destination until [`release`](GatedMatrixProvider::release) is called.
/// Lets a test pin one search mid-fetch while a later search completes.
pub struct GatedMatrixProvider {
    inner: TableMatrixProvider,
    held: LatLng,
    released: Mutex<bool>,
    cond: Condvar,
}

impl GatedMatrixProvider {
    pub fn new(inner: TableMatrixProvider, held: LatLng) -> Self {
        Self {
            inner,
            held,
            released: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    pub fn release(&self) {
        let mut released = self.released.lock().expect("gate lock");
        *released = true;
        self.cond.notify_all();
    }
}

impl MatrixProvider for GatedMatrixProvider {
    fn travel_times(
        &self,
        origins: &[LatLng],
        destination: LatLng,
        mode: TravelMode,
        units: UnitSystem,
    ) -> Result<Vec<ModeMetric>, MatrixError> {
        if key(destination) == key(self.held) {
            let mut released = self.released.lock().expect("gate lock");
            while !*released {
                released = self.cond.wait(released).expect("gate wait");
            }
        }
        self.inner.travel_times(origins, destination, mode, units)
    }
}
