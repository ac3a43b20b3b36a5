// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Change notification.
//!
//! Every committed mutation is reported once per affected element. All slices
//! are indexed by filter and have the list's filter count as their length.
//! For filter `f` the signed change of the view size is
//! `delta_sign * delta_count[f]`; `change_estimate[f] != 0` marks the views
//! that were touched at all. A `delta_sign` of zero reports a value change
//! that moved nothing.
//!
//! `element == None` means the whole list changed (clear or bulk import).
//! The vectors then carry view sizes rather than a delta to apply, and
//! subscribers are expected to refetch.

/// Receives element updates from a list.
pub trait ElementObserver<T> {
    fn on_element_updated(
        &mut self,
        element: Option<&T>,
        position: &[i32],
        change_estimate: &[i32],
        delta_sign: i32,
        delta_count: &[i32],
    );
}

/// Handle returned on registration, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Adapter that lets a closure act as an observer.
pub struct FnObserver<F>(pub F);

impl<T, F> ElementObserver<T> for FnObserver<F>
where
    F: FnMut(Option<&T>, &[i32], &[i32], i32, &[i32]),
{
    fn on_element_updated(
        &mut self,
        element: Option<&T>,
        position: &[i32],
        change_estimate: &[i32],
        delta_sign: i32,
        delta_count: &[i32],
    ) {
        (self.0)(element, position, change_estimate, delta_sign, delta_count);
    }
}

/// Registered observers, notified in registration order.
pub(crate) struct Observers<T> {
    entries: Vec<(ObserverId, Box<dyn ElementObserver<T>>)>,
    next_id: u64,
    #[cfg(debug_assertions)]
    dispatching: bool,
}

impl<T> Observers<T> {
    pub(crate) fn new() -> Observers<T> {
        return Observers {
            entries: Vec::new(),
            next_id: 0,
            #[cfg(debug_assertions)]
            dispatching: false,
        };
    }

    pub(crate) fn add(&mut self, observer: Box<dyn ElementObserver<T>>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        return id;
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        return self.entries.len() != before;
    }

    pub(crate) fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        return self.entries.len();
    }

    pub(crate) fn dispatch(
        &mut self,
        element: Option<&T>,
        position: &[i32],
        change_estimate: &[i32],
        delta_sign: i32,
        delta_count: &[i32],
    ) {
        #[cfg(debug_assertions)]
        {
            assert!(!self.dispatching, "re-entrant mutation during notification");
            self.dispatching = true;
        }
        for (_, observer) in self.entries.iter_mut() {
            observer.on_element_updated(element, position, change_estimate, delta_sign, delta_count);
        }
        #[cfg(debug_assertions)]
        {
            self.dispatching = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn dispatch_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers: Observers<char> = Observers::new();

        let first = Rc::clone(&log);
        observers.add(Box::new(FnObserver(
            move |element: Option<&char>, _: &[i32], _: &[i32], sign: i32, _: &[i32]| {
                first.borrow_mut().push((1, element.copied(), sign));
            },
        )));
        let second = Rc::clone(&log);
        let id = observers.add(Box::new(FnObserver(
            move |element: Option<&char>, _: &[i32], _: &[i32], sign: i32, _: &[i32]| {
                second.borrow_mut().push((2, element.copied(), sign));
            },
        )));

        observers.dispatch(Some(&'x'), &[0], &[1], 1, &[1]);
        assert_eq!(*log.borrow(), vec![(1, Some('x'), 1), (2, Some('x'), 1)]);

        assert!(observers.remove(id));
        assert!(!observers.remove(id));
        assert_eq!(observers.len(), 1);

        observers.dispatch(None, &[0], &[3], -1, &[3]);
        assert_eq!(log.borrow().last(), Some(&(1, None, -1)));
    }
}
