/// Determines what happens to live elements when a sequence is dropped.
///
/// By default, the sequence drops its elements when it is dropped.
///
/// # Examples
///
/// ```
/// use dynamic_sequence::{DropPolicy, DynamicSequence};
///
/// let mut sequence = DynamicSequence::<u32>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// sequence.push_back(1);
///
/// // The sequence must be emptied before it goes out of scope.
/// sequence.clear();
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The sequence drops its live elements when it is dropped. This is the default.
    #[default]
    MayDropItems,

    /// The sequence panics if it still contains elements when it is dropped.
    ///
    /// The elements and the storage are still released first. This may be valuable if the
    /// elements are accessed out of band through pointers obtained from the sequence and must
    /// be explicitly removed before the sequence goes away.
    MustNotDropItems,
}
