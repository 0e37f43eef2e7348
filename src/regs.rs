/// Bit-field descriptor inside a 32-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub shift: u8,
    pub width: u8,
}

impl BitField {
    pub const fn new(shift: u8, width: u8) -> Self {
        BitField { shift, width }
    }

    /// Mask of the field, already shifted into place.
    #[inline]
    pub const fn mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            ((1u32 << self.width) - 1) << self.shift
        }
    }

    #[inline]
    pub const fn get(&self, reg: u32) -> u32 {
        (reg & self.mask()) >> self.shift
    }

    /// Returns `reg` with this field replaced by `value`; excess high bits of
    /// `value` are dropped.
    #[inline]
    pub const fn set(&self, reg: u32, value: u32) -> u32 {
        (reg & !self.mask()) | ((value << self.shift) & self.mask())
    }

    /// Encodes `value` into an otherwise empty register word.
    #[inline]
    pub const fn encode(&self, value: u32) -> u32 {
        self.set(0, value)
    }
}

/// Word-wide access to a controller register block.
///
/// Accessors take `&self`: a register block behaves like a volatile memory
/// location and exclusive access is the caller's business.
pub trait RegisterAccess {
    fn read_reg32(&self, offset: u32) -> u32;

    fn write_reg32(&self, offset: u32, value: u32);

    #[inline]
    fn modify_reg32<F: FnOnce(u32) -> u32>(&self, offset: u32, f: F) {
        let value = self.read_reg32(offset);
        self.write_reg32(offset, f(value));
    }

    #[inline]
    fn set_bits32(&self, offset: u32, bits: u32) {
        self.modify_reg32(offset, |v| v | bits);
    }

    #[inline]
    fn clear_bits32(&self, offset: u32, bits: u32) {
        self.modify_reg32(offset, |v| v & !bits);
    }

    #[inline]
    fn read_field(&self, offset: u32, field: BitField) -> u32 {
        field.get(self.read_reg32(offset))
    }

    #[inline]
    fn write_field(&self, offset: u32, field: BitField, value: u32) {
        self.modify_reg32(offset, |v| field.set(v, value));
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    #[inline]
    fn read_reg32(&self, offset: u32) -> u32 {
        (**self).read_reg32(offset)
    }

    #[inline]
    fn write_reg32(&self, offset: u32, value: u32) {
        (**self).write_reg32(offset, value)
    }
}

#[macro_export]
macro_rules! impl_register_ops {
    ($struct_name:ident, $field_name:ident) => {
        impl $crate::regs::RegisterAccess for $struct_name {
            #[inline]
            fn read_reg32(&self, offset: u32) -> u32 {
                unsafe {
                    ::core::ptr::read_volatile((self.$field_name + offset as usize) as *const u32)
                }
            }

            #[inline]
            fn write_reg32(&self, offset: u32, value: u32) {
                unsafe {
                    ::core::ptr::write_volatile(
                        (self.$field_name + offset as usize) as *mut u32,
                        value,
                    )
                }
            }
        }
    };
}

/// Memory-mapped register block at a fixed base address.
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    base_addr: usize,
}

impl Mmio {
    /// # Safety
    ///
    /// `base_addr` must be the mapped, device-typed address of the controller
    /// register block and stay valid for as long as the returned value is used.
    pub const unsafe fn new(base_addr: usize) -> Self {
        Mmio { base_addr }
    }

    pub fn base_addr(&self) -> usize {
        self.base_addr
    }
}

impl_register_ops!(Mmio, base_addr);

/// Locates the register base of the first controller node compatible with one
/// of `compatible` in the flattened device tree at `dtb`.
#[cfg(feature = "fdt")]
pub fn find_controller_base(dtb: core::ptr::NonNull<u8>, compatible: &[&str]) -> Option<usize> {
    let fdt = fdt_parser::Fdt::from_ptr(dtb).ok()?;
    let node = fdt.find_compatible(compatible).next()?;
    let reg = node.reg()?.next()?;
    log::debug!("controller registers at {:#x}", reg.address);
    Some(reg.address as usize)
}
