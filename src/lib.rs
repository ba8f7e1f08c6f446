#![forbid(unsafe_code)]
#![forbid(trivial_numeric_casts)]
#![forbid(unused_qualifications)]
#![forbid(unused_results)]
#![forbid(unreachable_pub)]
#![forbid(deprecated_in_future)]

//! Context-adaptive binary arithmetic coding (CABAC) as specified by
//! ISO/IEC 14496-10 / ITU-T Rec. H.264 Annex 9: the regular/bypass/terminal
//! arithmetic engine pair, a bit-count-only simulation encoder, Exp-Golomb
//! integer codings built on top of them, and frequency accounting with
//! state re-initialization.
//!
//! ```
//! use cabac::encoder::Encoder;
//! use cabac::decoder::Decoder;
//! use cabac::state::new_state_vector;
//! use cabac::traits::{Decode, Encode};
//!
//! let mut stream = Vec::new();
//! {
//!     let mut enc = Encoder::new(&mut stream, new_state_vector(1));
//!     enc.encode(0, true).unwrap();
//!     enc.encode_terminal(true).unwrap();
//!     enc.finish().unwrap();
//! }
//!
//! let mut dec = Decoder::new(&stream[..], new_state_vector(1)).unwrap();
//! assert_eq!(dec.decode(0).unwrap(), true);
//! assert_eq!(dec.decode_terminal().unwrap(), true);
//! ```

pub mod counting;
pub mod decoder;
pub mod encoder;
pub mod integer;
pub mod sim;
pub mod state;
pub(crate) mod tables;
pub mod traits;

pub use counting::{
    expect_for_state, initialization_vector, CountingDecoder, CountingEncoder, Frequency,
    FrequencyVector,
};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use integer::{decode_seg, decode_ueg, encode_seg, encode_ueg};
pub use sim::SimulationEncoder;
pub use state::{new_state_vector, StateVector};
pub use traits::{Decode, Encode};
