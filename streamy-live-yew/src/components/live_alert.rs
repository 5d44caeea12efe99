use streamy_live_core::error::{LiveError, Severity};
use yew::prelude::*;

/// What the alert's button does
#[derive(Clone, PartialEq)]
pub enum AlertAction {
    None,
    Retry(Callback<()>),
    Reload,
}

#[derive(Properties, PartialEq)]
pub struct LiveAlertProps {
    pub error: LiveError,
    #[prop_or(AlertAction::None)]
    pub action: AlertAction,
}

fn reload_page() {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().reload() {
            tracing::error!("❌ Page reload failed: {:?}", e);
        }
    }
}

/// Error banner for the live view; informational errors are not styled as
/// failures
#[function_component(LiveAlert)]
pub fn live_alert(props: &LiveAlertProps) -> Html {
    let informational = props.error.severity() == Severity::Informational;

    let button = match &props.action {
        AlertAction::None => html! {},
        AlertAction::Retry(retry) => {
            let retry = retry.clone();
            html! {
                <button class="streamy-alert__action" onclick={move |_| retry.emit(())}>
                    {"Try again"}
                </button>
            }
        }
        AlertAction::Reload => html! {
            <button class="streamy-alert__action" onclick={|_| reload_page()}>
                {"Reload page"}
            </button>
        },
    };

    html! {
        <div
            class={classes!(
                "streamy-alert",
                if informational { "streamy-alert--info" } else { "streamy-alert--destructive" }
            )}
            role="alert"
        >
            <span class="streamy-alert__icon" aria-hidden="true">
                {if informational { "ℹ️" } else { "⚠️" }}
            </span>
            <div class="streamy-alert__body">
                <strong class="streamy-alert__title">{props.error.title()}</strong>
                <p class="streamy-alert__description">{props.error.user_message()}</p>
                {button}
            </div>
        </div>
    }
}
