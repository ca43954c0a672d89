#![forbid(unsafe_code)]

//! The wrapped-component contract.

use crate::props::RenderProps;

/// Something that renders from [`RenderProps`].
///
/// What a render produces is up to the host; closures of the form
/// `Fn(&RenderProps) -> O` are components.
pub trait Component {
    type Output;

    fn render(&self, props: &RenderProps) -> Self::Output;
}

impl<F, O> Component for F
where
    F: Fn(&RenderProps) -> O,
{
    type Output = O;

    fn render(&self, props: &RenderProps) -> O {
        self(props)
    }
}
