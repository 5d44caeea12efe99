/// Probe for the engine SDK's global binding
///
/// Browsers implement this by looking the CDN global up on `window`.
pub trait SdkProvider {
    type Handle: Clone;

    /// The SDK handle if it is available right now.
    fn try_get(&self) -> Option<Self::Handle>;
}

impl<P: SdkProvider + ?Sized> SdkProvider for std::rc::Rc<P> {
    type Handle = P::Handle;

    fn try_get(&self) -> Option<Self::Handle> {
        (**self).try_get()
    }
}
