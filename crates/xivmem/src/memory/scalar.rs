//! Fixed-width little-endian scalar codec.

/// A fixed-width value that can be read from or written to target memory.
///
/// Values are always encoded little-endian, matching x86/x64 targets.
pub trait Scalar: Copy + Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode from exactly `SIZE` bytes. Returns `None` if the slice has the
    /// wrong length.
    fn from_le_slice(bytes: &[u8]) -> Option<Self>;

    /// Encode into `SIZE` bytes
    fn to_le_vec(self) -> Vec<u8>;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Option<Self> {
                    let array: [u8; std::mem::size_of::<$ty>()] = bytes.try_into().ok()?;
                    Some(<$ty>::from_le_bytes(array))
                }

                fn to_le_vec(self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(<u8 as Scalar>::SIZE, 1);
        assert_eq!(<i16 as Scalar>::SIZE, 2);
        assert_eq!(<f32 as Scalar>::SIZE, 4);
        assert_eq!(<u64 as Scalar>::SIZE, 8);
    }

    #[test]
    fn test_little_endian_layout() {
        assert_eq!(0x1234_5678u32.to_le_vec(), vec![0x78, 0x56, 0x34, 0x12]);
        assert_eq!(u32::from_le_slice(&[0x78, 0x56, 0x34, 0x12]), Some(0x1234_5678));
        assert_eq!(i16::from_le_slice(&[0xFF, 0xFF]), Some(-1));
        assert_eq!(f32::from_le_slice(&1.5f32.to_le_bytes()), Some(1.5));
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        assert_eq!(u32::from_le_slice(&[1, 2, 3]), None);
        assert_eq!(u16::from_le_slice(&[1, 2, 3]), None);
    }
}
