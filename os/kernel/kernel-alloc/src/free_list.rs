use crate::page::{FrameIndex, Page};

/// Free blocks of one order.
///
/// The list is intrusive: linkage lives in the [`Page`] records of the block
/// heads, so the list itself is just a head index and a count. Order within the
/// list carries no meaning; new members go to the front and allocation takes
/// the front.
///
/// # Invariants
/// - Every member is a block head with `allocated == false`.
/// - `nr_free` equals the number of members.
/// - A record is linked into at most one list at a time.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FreeList {
    head: Option<FrameIndex>,
    nr_free: usize,
}

impl FreeList {
    pub const EMPTY: Self = Self {
        head: None,
        nr_free: 0,
    };

    /// Number of free blocks of this order.
    #[inline]
    #[must_use]
    pub const fn nr_free(&self) -> usize {
        self.nr_free
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    #[inline]
    #[must_use]
    pub const fn first(&self) -> Option<FrameIndex> {
        self.head
    }

    /// Link `block` in front of the current head.
    pub(crate) fn push_front(&mut self, pages: &mut [Page], block: FrameIndex) {
        debug_assert!(
            !pages[block.as_usize()].is_linked() && self.head != Some(block),
            "{block:?} is already on a free list"
        );

        let old_head = self.head;
        {
            let page = &mut pages[block.as_usize()];
            page.prev = None;
            page.next = old_head;
        }
        if let Some(old) = old_head {
            pages[old.as_usize()].prev = Some(block);
        }
        self.head = Some(block);
        self.nr_free += 1;
    }

    /// Unlink `block`, which must be a member of this list.
    pub(crate) fn remove(&mut self, pages: &mut [Page], block: FrameIndex) {
        let (prev, next) = {
            let page = &mut pages[block.as_usize()];
            (page.prev.take(), page.next.take())
        };

        match prev {
            Some(p) => pages[p.as_usize()].next = next,
            None => {
                debug_assert_eq!(self.head, Some(block), "{block:?} is not on this list");
                self.head = next;
            }
        }
        if let Some(n) = next {
            pages[n.as_usize()].prev = prev;
        }

        debug_assert!(self.nr_free > 0);
        self.nr_free -= 1;
    }

    /// Walk the members from the front.
    pub fn iter<'a>(&self, pages: &'a [Page]) -> impl Iterator<Item = FrameIndex> + use<'a> {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            let current = cursor?;
            cursor = pages[current.as_usize()].next;
            Some(current)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(list: &FreeList, pages: &[Page]) -> Vec<usize> {
        list.iter(pages).map(FrameIndex::as_usize).collect()
    }

    #[test]
    fn push_front_orders_newest_first() {
        let mut pages = vec![Page::default(); 4];
        let mut list = FreeList::EMPTY;

        list.push_front(&mut pages, FrameIndex::new(0));
        list.push_front(&mut pages, FrameIndex::new(2));
        list.push_front(&mut pages, FrameIndex::new(3));

        assert_eq!(list.nr_free(), 3);
        assert_eq!(list.first(), Some(FrameIndex::new(3)));
        assert_eq!(members(&list, &pages), [3, 2, 0]);
    }

    #[test]
    fn remove_head_middle_and_tail() {
        let mut pages = vec![Page::default(); 5];
        let mut list = FreeList::EMPTY;
        for i in 0..5 {
            list.push_front(&mut pages, FrameIndex::new(i));
        }

        list.remove(&mut pages, FrameIndex::new(2));
        assert_eq!(members(&list, &pages), [4, 3, 1, 0]);

        list.remove(&mut pages, FrameIndex::new(4));
        assert_eq!(members(&list, &pages), [3, 1, 0]);

        list.remove(&mut pages, FrameIndex::new(0));
        assert_eq!(members(&list, &pages), [3, 1]);
        assert_eq!(list.nr_free(), 2);

        assert!(!pages[2].is_linked());
        assert!(!pages[4].is_linked());
        assert!(!pages[0].is_linked());
    }

    #[test]
    fn removing_last_member_empties_list() {
        let mut pages = vec![Page::default(); 1];
        let mut list = FreeList::EMPTY;

        list.push_front(&mut pages, FrameIndex::new(0));
        list.remove(&mut pages, FrameIndex::new(0));

        assert!(list.is_empty());
        assert_eq!(list.nr_free(), 0);
        assert_eq!(list.iter(&pages).count(), 0);
    }
}
