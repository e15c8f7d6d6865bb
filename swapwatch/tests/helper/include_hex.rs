#[allow(unused_macros)]
macro_rules! include_hex {
    ($file:expr, $network:expr) => {{
        swapwatch::bitcoin::Transaction::decode_hex(include_str!($file), $network).unwrap()
    }};
}
