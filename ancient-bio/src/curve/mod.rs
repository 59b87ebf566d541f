//! Space-filling curve layout and resampling

pub mod hilbert;
pub mod resample;

pub use hilbert::{
    cell_count, construct, index_to_point, order_for_len, place, point_to_index, side,
    HilbertTable,
};
pub use resample::resample;
