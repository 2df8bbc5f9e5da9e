
/// Performs a `return Err(SimError::InvalidConfig(format!("...")))` for maximum laziness
macro_rules! invalid {
    ($($args:tt)*) => {{
        return Err($crate::error::SimError::InvalidConfig(format!($($args)*)));
    }}
}
pub(crate) use invalid;

/// Helper functions for bit operations and address decomposition
pub mod bit_ops {
    use crate::error::Result;

    /// Width of a virtual address in bits
    pub const ADDRESS_BITS: u32 = bit_size::<u32>() as u32;

    /// Deepest hierarchical table supported
    pub const MAX_LEVELS: usize = 3;

    /// Calculates the number of bits a rust type requires
    pub const fn bit_size<T>() -> usize {
        std::mem::size_of::<T>() * 8
    }

    /// Checks if a number is a power of 2
    pub fn is_pow2(n: u64) -> bool {
        n.count_ones() == 1
    }

    /// Mask covering the low `n` bits. Safe for `n == 32`.
    fn low_mask(n: u32) -> u64 {
        (1u64 << n) - 1
    }

    /// Splits a u32 into two u32s at the bit index
    pub fn split_bits(x: u32, n: u32) -> (u32, u32) {
        let mask = low_mask(n.min(ADDRESS_BITS));
        let right = (x as u64 & mask) as u32;
        let left = x.checked_shr(n).unwrap_or(0);
        (left, right)
    }

    /// Number of offset bits for a page of `page_size` bytes
    pub fn offset_bits(page_size: u64) -> Result<u32> {
        if !is_pow2(page_size) {
            crate::utils::invalid!("page size {} is not a power of two", page_size);
        }
        let bits = page_size.trailing_zeros();
        if bits > ADDRESS_BITS {
            crate::utils::invalid!("page size {} exceeds the {}-bit address space", page_size, ADDRESS_BITS);
        }
        Ok(bits)
    }

    /// Splits the page number bits evenly across `levels`.
    ///
    /// Remainder bits always go to the first (most significant) level, so a 21-bit
    /// page number over two levels is `[11, 10]` and over three levels is `[7, 7, 7]`.
    pub fn level_widths(offset_bits: u32, levels: usize) -> Result<Vec<u32>> {
        if levels == 0 || levels > MAX_LEVELS {
            crate::utils::invalid!("{} page table levels requested, supported range is 1..={}", levels, MAX_LEVELS);
        }
        if offset_bits > ADDRESS_BITS {
            crate::utils::invalid!("{} offset bits leave no room for a page number", offset_bits);
        }
        let remaining = ADDRESS_BITS - offset_bits;
        let base = remaining / levels as u32;
        let extra = remaining % levels as u32;

        let mut widths = vec![base; levels];
        widths[0] += extra;
        validate_widths(offset_bits, &widths)?;
        Ok(widths)
    }

    /// Offset bits and level widths must account for the whole address
    pub fn validate_widths(offset_bits: u32, widths: &[u32]) -> Result<()> {
        if widths.is_empty() || widths.len() > MAX_LEVELS {
            crate::utils::invalid!("{} page table levels given, supported range is 1..={}", widths.len(), MAX_LEVELS);
        }
        let total = offset_bits + widths.iter().sum::<u32>();
        if total != ADDRESS_BITS {
            crate::utils::invalid!(
                "offset bits ({}) and level widths {:?} sum to {}, expected {}",
                offset_bits, widths, total, ADDRESS_BITS
            );
        }
        Ok(())
    }

    /// Per-level indices of a page number, most significant level first.
    /// Slots past `widths.len()` are zero.
    pub fn level_indices(page_number: u32, widths: &[u32]) -> [u32; MAX_LEVELS] {
        let mut indices = [0; MAX_LEVELS];
        let mut shift: u32 = widths.iter().sum();
        for (slot, &width) in indices.iter_mut().zip(widths) {
            shift -= width;
            *slot = ((page_number as u64 >> shift) & low_mask(width)) as u32;
        }
        indices
    }

    /// A virtual address broken into its page number, page offset and table indices
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Decomposed {
        pub page_number: u32,
        pub page_offset: u32,
        indices: [u32; MAX_LEVELS],
        depth: usize,
    }

    impl Decomposed {
        pub fn indices(&self) -> &[u32] {
            &self.indices[..self.depth]
        }
    }

    /// Shifts out the page offset, then carves the page number into `widths`.
    /// An empty `widths` yields just the page number.
    pub fn decompose(address: u32, offset_bits: u32, widths: &[u32]) -> Decomposed {
        let (page_number, page_offset) = split_bits(address, offset_bits);
        let depth = widths.len().min(MAX_LEVELS);
        Decomposed {
            page_number,
            page_offset,
            indices: level_indices(page_number, &widths[..depth]),
            depth,
        }
    }

}
