//! Resource surface collaborators
//!
//! A surface is an ordered list of slots owned by a principal (a personal
//! store, an attached container). Steps enumerate surfaces in a fixed,
//! adapter-supplied order; slot contents are copied out for snapshots and
//! restored verbatim on rollback.

use bursar_types::ResourceId;
use parking_lot::Mutex;

/// A homogeneous stack of one resource occupying a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    resource: ResourceId,
    quantity: u32,
}

impl Stack {
    pub fn new(resource: ResourceId, quantity: u32) -> Self {
        Self { resource, quantity }
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Ordered slot storage with copy-out snapshots and verbatim restore
pub trait ResourceSurface: Send + Sync {
    /// Number of ordered slots
    fn slot_count(&self) -> usize;

    /// Copy of the stack at the slot, if occupied
    fn stack_at(&self, index: usize) -> Option<Stack>;

    /// Replace the slot contents; out-of-range indices are ignored
    fn set_stack_at(&self, index: usize, stack: Option<Stack>);

    /// Place units of a resource, merging into existing stacks first.
    /// Returns how many units were placed.
    fn insert(&self, resource: &ResourceId, quantity: u32) -> u32;
}

/// Vec-backed surface for tests, demos, and in-memory deployments
pub struct MemorySurface {
    slots: Mutex<Vec<Option<Stack>>>,
}

impl MemorySurface {
    /// Create a surface with the given number of empty slots
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: Mutex::new(vec![None; slot_count]),
        }
    }

    /// Create a surface with explicit slot contents
    pub fn with_stacks(slots: Vec<Option<Stack>>) -> Self {
        Self {
            slots: Mutex::new(slots),
        }
    }

    /// Copy of the full slot layout, for exact state comparisons
    pub fn snapshot(&self) -> Vec<Option<Stack>> {
        self.slots.lock().clone()
    }

    /// Total owned quantity of a resource across all slots
    pub fn total_of(&self, resource: &ResourceId) -> u64 {
        self.slots
            .lock()
            .iter()
            .flatten()
            .filter(|stack| stack.resource() == resource)
            .map(|stack| u64::from(stack.quantity()))
            .sum()
    }
}

impl ResourceSurface for MemorySurface {
    fn slot_count(&self) -> usize {
        self.slots.lock().len()
    }

    fn stack_at(&self, index: usize) -> Option<Stack> {
        self.slots.lock().get(index).cloned().flatten()
    }

    fn set_stack_at(&self, index: usize, stack: Option<Stack>) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get_mut(index) {
            *slot = stack;
        }
    }

    fn insert(&self, resource: &ResourceId, quantity: u32) -> u32 {
        let mut slots = self.slots.lock();
        let mut remaining = quantity;

        for slot in slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            match slot {
                Some(stack) if stack.resource() == resource => {
                    stack.quantity = stack.quantity.saturating_add(remaining);
                    remaining = 0;
                }
                None => {
                    *slot = Some(Stack::new(resource.clone(), remaining));
                    remaining = 0;
                }
                Some(_) => {}
            }
        }

        quantity - remaining
    }
}
