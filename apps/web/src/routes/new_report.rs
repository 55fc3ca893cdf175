//! Incident filing form. Evidence is uploaded first when present, then
//! the report row is inserted with a status derived from the author's
//! role, and finally the notification function is invoked. A failed
//! notification is logged and swallowed; the report already exists.

use auth_session::{target_route_for, Route};
use backend_client::{
    Backend, BackendError, IncidentNotification, NewIncidentReport, ReportStatus, INCIDENT_TYPES,
};
use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use wasm_bindgen_futures::JsFuture;

use crate::components::{Alert, AlertKind, AppShell, Button, Spinner};
use crate::features::auth::state::{use_session, Machine};
use crate::features::auth::RequireAuth;

const INPUT: &str = "w-full rounded-lg border border-gray-300 bg-white px-3 py-2.5 text-sm text-gray-900 focus:border-indigo-400 focus:ring-2 focus:ring-indigo-200";

#[derive(Clone)]
/// Captured form state, including the picked evidence file handle.
struct ReportInput {
    student_id: Option<i64>,
    student_names: String,
    class_name: String,
    incident_date: String,
    incident_type: String,
    description: String,
    evidence: Option<web_sys::File>,
}

#[component]
pub fn NewReportPage() -> impl IntoView {
    let session = use_session();
    let session_for_nav = session.clone();

    let backend_for_roster = session.backend.clone();
    let students = LocalResource::new(move || {
        let backend = backend_for_roster.clone();
        async move { backend.list_students().await }
    });

    let (student_id, set_student_id) = signal::<Option<i64>>(None);
    let (student_names, set_student_names) = signal(String::new());
    let (class_name, set_class_name) = signal(String::new());
    let (incident_date, set_incident_date) = signal(today());
    let (incident_type, set_incident_type) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(None);
    let evidence_input: NodeRef<leptos::html::Input> = NodeRef::new();

    let machine = session.machine.clone();
    let backend_for_submit = session.backend.clone();
    let submit_action = Action::new_local(move |input: &ReportInput| {
        let backend = backend_for_submit.clone();
        let machine = machine.clone();
        let input = input.clone();
        async move { file_report(&backend, &machine, input).await }
    });

    let navigate = use_navigate();
    Effect::new(move |_| {
        if let Some(result) = submit_action.value().get() {
            match result {
                Ok(()) => navigate(session_for_nav.landing_path(), Default::default()),
                Err(err) => set_error.set(Some(err.to_string())),
            }
        }
    });

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        set_error.set(None);

        let names_value = student_names.get_untracked().trim().to_string();
        if names_value.is_empty() {
            set_error.set(Some("Student name(s) are required.".to_string()));
            return;
        }
        let class_value = class_name.get_untracked().trim().to_string();
        if class_value.is_empty() {
            set_error.set(Some("Class is required.".to_string()));
            return;
        }
        let date_value = incident_date.get_untracked().trim().to_string();
        if date_value.is_empty() {
            set_error.set(Some("Date is required.".to_string()));
            return;
        }
        let type_value = incident_type.get_untracked();
        if type_value.is_empty() {
            set_error.set(Some("Incident type is required.".to_string()));
            return;
        }
        let description_value = description.get_untracked().trim().to_string();
        if description_value.is_empty() {
            set_error.set(Some("Description is required.".to_string()));
            return;
        }

        let evidence = evidence_input
            .get()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0));

        submit_action.dispatch(ReportInput {
            student_id: student_id.get_untracked(),
            student_names: names_value,
            class_name: class_value,
            incident_date: date_value,
            incident_type: type_value,
            description: description_value,
            evidence,
        });
    };

    view! {
        <AppShell>
            <RequireAuth children=move || view! {
                <form class="max-w-2xl mx-auto space-y-5" on:submit=on_submit>
                    <h1 class="text-2xl font-semibold text-gray-900">
                        "New Incident Report"
                    </h1>

                    <div>
                        <label class="block mb-2 text-sm font-medium text-gray-900" for="student">
                            "Student"
                        </label>
                        <select
                            id="student"
                            class=INPUT
                            on:change=move |event| {
                                let value = event_target_value(&event);
                                match value.parse::<i64>() {
                                    Ok(id) => {
                                        set_student_id.set(Some(id));
                                        if let Some(Ok(list)) = students.get() {
                                            if let Some(student) =
                                                list.iter().find(|student| student.id == id)
                                            {
                                                set_student_names.set(student.name.clone());
                                            }
                                        }
                                    }
                                    Err(_) => set_student_id.set(None),
                                }
                            }
                        >
                            <option value="" selected=true>
                                "Select from the roster (optional)"
                            </option>
                            {move || match students.get() {
                                Some(Ok(list)) => list
                                    .iter()
                                    .map(|student| {
                                        view! {
                                            <option value=student.id.to_string()>
                                                {format!(
                                                    "{} - Grade {}",
                                                    student.name, student.grade
                                                )}
                                            </option>
                                        }
                                    })
                                    .collect_view()
                                    .into_any(),
                                _ => ().into_any(),
                            }}
                        </select>
                    </div>

                    <div>
                        <label
                            class="block mb-2 text-sm font-medium text-gray-900"
                            for="student_names"
                        >
                            "Student Name(s)"
                        </label>
                        <input
                            id="student_names"
                            type="text"
                            class=INPUT
                            placeholder="Enter student name(s)"
                            prop:value=move || student_names.get()
                            on:input=move |event| {
                                set_student_names.set(event_target_value(&event));
                            }
                        />
                    </div>

                    <div>
                        <label class="block mb-2 text-sm font-medium text-gray-900" for="class">
                            "Class"
                        </label>
                        <input
                            id="class"
                            type="text"
                            class=INPUT
                            placeholder="Enter class"
                            on:input=move |event| {
                                set_class_name.set(event_target_value(&event));
                            }
                        />
                    </div>

                    <div class="grid grid-cols-1 sm:grid-cols-2 gap-4">
                        <div>
                            <label
                                class="block mb-2 text-sm font-medium text-gray-900"
                                for="incident_date"
                            >
                                "Date of Incident"
                            </label>
                            <input
                                id="incident_date"
                                type="date"
                                class=INPUT
                                prop:value=move || incident_date.get()
                                on:input=move |event| {
                                    set_incident_date.set(event_target_value(&event));
                                }
                            />
                        </div>
                        <div>
                            <label
                                class="block mb-2 text-sm font-medium text-gray-900"
                                for="incident_type"
                            >
                                "Type of Incident"
                            </label>
                            <select
                                id="incident_type"
                                class=INPUT
                                on:change=move |event| {
                                    set_incident_type.set(event_target_value(&event));
                                }
                            >
                                <option value="" selected=true>
                                    "Select incident type"
                                </option>
                                {INCIDENT_TYPES
                                    .iter()
                                    .map(|kind| view! { <option value=*kind>{*kind}</option> })
                                    .collect_view()}
                            </select>
                        </div>
                    </div>

                    <div>
                        <label
                            class="block mb-2 text-sm font-medium text-gray-900"
                            for="description"
                        >
                            "Description"
                        </label>
                        <textarea
                            id="description"
                            class=INPUT
                            rows="5"
                            placeholder="Describe what happened"
                            on:input=move |event| {
                                set_description.set(event_target_value(&event));
                            }
                        ></textarea>
                    </div>

                    <div>
                        <label class="block mb-2 text-sm font-medium text-gray-900" for="evidence">
                            "Evidence (optional)"
                        </label>
                        <input
                            node_ref=evidence_input
                            id="evidence"
                            type="file"
                            accept="video/*,audio/*"
                            class="block w-full text-sm text-gray-500 file:mr-4 file:rounded-lg file:border-0 file:bg-indigo-50 file:px-4 file:py-2 file:text-sm file:font-medium file:text-indigo-700 hover:file:bg-indigo-100"
                        />
                        <p class="mt-1 text-xs text-gray-400">
                            "Video or audio, up to 100MB."
                        </p>
                    </div>

                    <div class="flex justify-end">
                        <Button button_type="submit" disabled=submit_action.pending()>
                            "Submit Report"
                        </Button>
                    </div>
                    {move || {
                        submit_action
                            .pending()
                            .get()
                            .then_some(view! { <Spinner /> })
                    }}
                    {move || {
                        error
                            .get()
                            .map(|message| {
                                view! { <Alert kind=AlertKind::Error message=message /> }
                            })
                    }}
                </form>
            } />
        </AppShell>
    }
}

async fn file_report(
    backend: &Backend,
    machine: &Machine,
    input: ReportInput,
) -> Result<(), BackendError> {
    let snapshot = machine.snapshot();
    let Some(user) = snapshot.user else {
        return Err(BackendError::Validation(
            "Your session has expired. Sign in again.".to_string(),
        ));
    };

    let evidence = match input.evidence {
        Some(file) => {
            let buffer = JsFuture::from(file.array_buffer()).await.map_err(|_| {
                BackendError::Transport("could not read the selected file".to_string())
            })?;
            let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
            Some(
                backend
                    .upload_evidence(&file.name(), &file.type_(), bytes)
                    .await?,
            )
        }
        None => None,
    };

    // Filings from the administrative tier skip the review queue.
    let status = if target_route_for(snapshot.resolved_role()) == Route::AdminHome {
        ReportStatus::Approved
    } else {
        ReportStatus::Pending
    };

    let report = backend
        .create_report(&NewIncidentReport {
            student_id: input.student_id,
            student_names: input.student_names.clone(),
            class_name: input.class_name,
            incident_date: input.incident_date,
            description: input.description.clone(),
            incident_type: input.incident_type.clone(),
            status,
            created_by: user.id.clone(),
            evidence_url: evidence.as_ref().map(|uploaded| uploaded.url.clone()),
            evidence_type: evidence
                .as_ref()
                .map(|uploaded| uploaded.kind.as_str().to_string()),
        })
        .await?;

    if let Err(err) = backend
        .notify_incident(&IncidentNotification {
            report_id: report.id,
            student_names: input.student_names,
            incident_type: input.incident_type,
            description: input.description,
            created_by: user.id,
        })
        .await
    {
        tracing::warn!(error = %err, report_id = report.id, "incident notification failed");
    }

    Ok(())
}

/// Today's date as `YYYY-MM-DD`, the default for the incident date field.
fn today() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
        .split('T')
        .next()
        .unwrap_or_default()
        .to_string()
}
