use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LoadingStateProps {
    #[prop_or(AttrValue::Static("Loading..."))]
    pub message: AttrValue,
}

#[function_component(LoadingState)]
pub fn loading_state(props: &LoadingStateProps) -> Html {
    html! {
        <div class="streamy-state streamy-state--loading">
            <span class="streamy-state__spinner" aria-hidden="true">{"⏳"}</span>
            <span class="streamy-state__message">{&props.message}</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ErrorStateProps {
    #[prop_or(AttrValue::Static("Something went wrong. Please try again."))]
    pub message: AttrValue,
}

#[function_component(ErrorState)]
pub fn error_state(props: &ErrorStateProps) -> Html {
    html! {
        <div class="streamy-state streamy-state--error" role="alert">
            <span aria-hidden="true">{"⚠️"}</span>
            <span class="streamy-state__message">{&props.message}</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct EmptyStateProps {
    #[prop_or(AttrValue::Static("No data available."))]
    pub message: AttrValue,
}

#[function_component(EmptyState)]
pub fn empty_state(props: &EmptyStateProps) -> Html {
    html! {
        <div class="streamy-state streamy-state--empty">
            <p class="streamy-state__message">{&props.message}</p>
        </div>
    }
}
