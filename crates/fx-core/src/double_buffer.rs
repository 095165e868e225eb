/// Two slots of the same resource: one readable ("current"), one written.
///
/// The only way to write is [`DoubleBuffer::write_and_swap`], which hands the
/// closure the current slot read-only and the other slot mutably, then flips
/// them. A slot can never be read and written in the same step, and each call
/// is exactly one swap.
#[derive(Clone, Debug)]
pub struct DoubleBuffer<T> {
    slots: [T; 2],
    front: usize,
    swaps: u64,
}

impl<T> DoubleBuffer<T> {
    pub fn new(current: T, back: T) -> Self {
        Self {
            slots: [current, back],
            front: 0,
            swaps: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.slots[self.front]
    }

    /// Index of the readable slot (0 or 1), for callers that keep parallel
    /// per-slot resources such as bind groups.
    pub fn front_index(&self) -> usize {
        self.front
    }

    pub fn swap_count(&self) -> u64 {
        self.swaps
    }

    pub fn slots(&self) -> &[T; 2] {
        &self.slots
    }

    pub fn write_and_swap<R>(&mut self, f: impl FnOnce(&T, &mut T) -> R) -> R {
        let (a, b) = self.slots.split_at_mut(1);
        let out = if self.front == 0 {
            f(&a[0], &mut b[0])
        } else {
            f(&b[0], &mut a[0])
        };
        self.front ^= 1;
        self.swaps += 1;
        out
    }
}

impl<T: Clone> DoubleBuffer<T> {
    pub fn filled(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}
