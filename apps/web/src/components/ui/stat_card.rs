use leptos::prelude::*;

/// One tile of the stats row: a label, a big number, and a caption.
#[component]
pub fn StatCard(
    title: &'static str,
    #[prop(into)] value: Signal<usize>,
    caption: &'static str,
) -> impl IntoView {
    view! {
        <div class="rounded-lg border border-gray-200 bg-white p-5 shadow-sm">
            <p class="text-sm font-medium text-gray-500">{title}</p>
            <p class="mt-1 text-2xl font-bold text-gray-900">{move || value.get()}</p>
            <p class="text-xs text-gray-400">{caption}</p>
        </div>
    }
}
