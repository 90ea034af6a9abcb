//! Little-endian conversions between byte buffers and primitive values.
//!
//! COMTRADE binary records are always little-endian regardless of host byte
//! order, so every conversion here is explicit shift/mask arithmetic over a
//! byte slice. Callers are responsible for passing a buffer that holds enough
//! bytes at `index`; record buffers are always sized from the schema.

pub fn to_u16(buffer: &[u8], index: usize) -> u16 {
    buffer[index] as u16 | (buffer[index + 1] as u16) << 8
}

pub fn to_i16(buffer: &[u8], index: usize) -> i16 {
    to_u16(buffer, index) as i16
}

pub fn to_u32(buffer: &[u8], index: usize) -> u32 {
    buffer[index] as u32
        | (buffer[index + 1] as u32) << 8
        | (buffer[index + 2] as u32) << 16
        | (buffer[index + 3] as u32) << 24
}

pub fn to_i32(buffer: &[u8], index: usize) -> i32 {
    to_u32(buffer, index) as i32
}

pub fn to_f32(buffer: &[u8], index: usize) -> f32 {
    f32::from_bits(to_u32(buffer, index))
}

pub fn u16_bytes(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

pub fn i16_bytes(value: i16) -> [u8; 2] {
    u16_bytes(value as u16)
}

pub fn u32_bytes(value: u32) -> [u8; 4] {
    [
        value as u8,
        (value >> 8) as u8,
        (value >> 16) as u8,
        (value >> 24) as u8,
    ]
}

pub fn i32_bytes(value: i32) -> [u8; 4] {
    u32_bytes(value as u32)
}

pub fn f32_bytes(value: f32) -> [u8; 4] {
    u32_bytes(value.to_bits())
}
