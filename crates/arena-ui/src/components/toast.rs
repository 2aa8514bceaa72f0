use std::time::Duration;

use leptos::prelude::*;

const TOAST_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

impl ToastLevel {
    fn class(&self) -> &'static str {
        match self {
            ToastLevel::Success => "toast toast-success",
            ToastLevel::Error => "toast toast-error",
            ToastLevel::Info => "toast toast-info",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
}

#[derive(Clone, Debug, Default)]
struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

/// Handle for posting transient notices, e.g. a failed login or an expired session.
#[derive(Clone, Copy)]
pub struct ToastContext {
    queue: RwSignal<ToastQueue>,
}

impl ToastContext {
    pub fn push(&self, message: impl Into<String>, level: ToastLevel) {
        let mut postedId = 0;
        let message = message.into();
        self.queue.update(|queue| {
            postedId = queue.next_id;
            queue.next_id += 1;
            queue.toasts.push(Toast {
                id: postedId,
                message,
                level,
            });
        });

        let queue = self.queue;
        set_timeout(
            move || queue.update(|queue| queue.toasts.retain(|t| t.id != postedId)),
            TOAST_LIFETIME,
        );
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(message, ToastLevel::Error);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(message, ToastLevel::Success);
    }
}

#[component]
pub fn ToastProvider(children: Children) -> impl IntoView {
    let queue = RwSignal::new(ToastQueue::default());
    provide_context(ToastContext { queue });

    view! {
        {children()}
        <div class="toast-container">
            <For
                each=move || queue.with(|queue| queue.toasts.clone())
                key=|toast| toast.id
                let:toast
            >
                <div class=toast.level.class()>{toast.message.clone()}</div>
            </For>
        </div>
    }
}
