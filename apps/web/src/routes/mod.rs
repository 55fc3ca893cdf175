mod admin;
mod dashboard;
mod index;
mod login;
mod new_report;
mod not_found;
mod register;
mod settings;
mod student_reports;
mod students;

pub(crate) use admin::AdminPage;
pub(crate) use dashboard::DashboardPage;
pub(crate) use index::IndexPage;
pub(crate) use login::LoginPage;
pub(crate) use new_report::NewReportPage;
pub(crate) use not_found::NotFoundPage;
pub(crate) use register::RegisterPage;
pub(crate) use settings::SettingsPage;
pub(crate) use student_reports::StudentReportsPage;
pub(crate) use students::StudentsPage;

use leptos::prelude::*;
use leptos_router::components::{Route, Routes};
use leptos_router::path;

/// Link builders for parameterized routes.
pub(crate) mod paths {
    pub fn student_reports(student_id: i64) -> String {
        format!("/students/{student_id}/reports")
    }
}

#[component]
pub fn AppRoutes() -> impl IntoView {
    view! {
        <Routes fallback=|| view! { <NotFoundPage /> }>
            <Route path=path!("/") view=IndexPage />
            <Route path=path!("/login") view=LoginPage />
            <Route path=path!("/register") view=RegisterPage />
            <Route path=path!("/dashboard") view=DashboardPage />
            <Route path=path!("/admin") view=AdminPage />
            <Route path=path!("/students") view=StudentsPage />
            <Route path=path!("/students/:id/reports") view=StudentReportsPage />
            <Route path=path!("/new-report") view=NewReportPage />
            <Route path=path!("/settings") view=SettingsPage />
            <Route path=path!("/*any") view=NotFoundPage />
        </Routes>
    }
}
