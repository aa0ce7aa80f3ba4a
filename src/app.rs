//! Application state management for lessondesk.
//!
//! `App` owns all fetched data and UI state. Network work runs on
//! spawned tokio tasks and reports back through one mpsc channel; the
//! main loop drains it via `check_background_tasks`. History, customer,
//! and home refreshes carry sequence numbers so a slow superseded
//! response can never overwrite newer data.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::home::{HomeQuery, HomeResponse};
use crate::api::ApiClient;
use crate::auth::{CredentialStore, Session};
use crate::cache::StoreDirectory;
use crate::config::Config;
use crate::models::{Customer, CustomerInput, Gender, Lesson, Principal, Role, Store};
use crate::repo::customers::{self, CustomerRepository};
use crate::repo::history::{self, StoreFilter};
use crate::repo::RequestGuard;
use crate::views::chart::{bucket_lessons, chart_scale, ChartBucket, ChartGranularity, MIN_CHART_SCALE};
use crate::views::pagination::{page_slice, Pager, PAGE_SIZE};
use crate::views::routes::{lesson_detail_path, Origin};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Rows shown in the home screen's recent and upcoming lists.
const HOME_LESSON_COUNT: usize = 5;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Customers,
    History,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Customers => "Customers",
            Tab::History => "History",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Home => Tab::Customers,
            Tab::Customers => Tab::History,
            Tab::History => Tab::Home,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Tab::Home => Tab::History,
            Tab::Customers => Tab::Home,
            Tab::History => Tab::Customers,
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    LoggingIn,
    EditingCustomer,
    ConfirmingDelete,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

// ============================================================================
// Customer form
// ============================================================================

/// Fields of the customer create/edit form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Kana,
    Gender,
    Birthday,
    Email,
    Phone,
    Address,
    Medical,
    Taboo,
    Height,
    Memo,
    Active,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::Name,
        FormField::Kana,
        FormField::Gender,
        FormField::Birthday,
        FormField::Email,
        FormField::Phone,
        FormField::Address,
        FormField::Medical,
        FormField::Taboo,
        FormField::Height,
        FormField::Memo,
        FormField::Active,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Kana => "Kana",
            FormField::Gender => "Gender",
            FormField::Birthday => "Birthday (YYYY-MM-DD)",
            FormField::Email => "Email",
            FormField::Phone => "Phone",
            FormField::Address => "Address",
            FormField::Medical => "Medical notes",
            FormField::Taboo => "Movement restrictions",
            FormField::Height => "Height (cm)",
            FormField::Memo => "Memo",
            FormField::Active => "Active",
        }
    }

    /// Gender and Active are toggled with space, not typed into.
    pub fn is_text(&self) -> bool {
        !matches!(self, FormField::Gender | FormField::Active)
    }
}

/// State of the customer create/edit overlay.
#[derive(Debug, Clone)]
pub struct CustomerForm {
    pub editing_id: Option<String>,
    pub name: String,
    pub kana: String,
    pub gender: Gender,
    pub birthday: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub medical: String,
    pub taboo: String,
    pub height: String,
    pub memo: String,
    pub is_active: bool,
    pub field_index: usize,
    pub error: Option<String>,
    first_posture_group_id: Option<String>,
}

impl CustomerForm {
    pub fn blank() -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            kana: String::new(),
            gender: Gender::Other,
            birthday: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            medical: String::new(),
            taboo: String::new(),
            height: String::new(),
            memo: String::new(),
            is_active: true,
            field_index: 0,
            error: None,
            first_posture_group_id: None,
        }
    }

    pub fn for_edit(customer: &Customer) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            editing_id: Some(customer.id.clone()),
            name: customer.name.clone(),
            kana: customer.kana.clone(),
            gender: customer.gender,
            birthday: customer
                .birthday
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            email: text(&customer.email),
            phone: text(&customer.phone),
            address: text(&customer.address),
            medical: text(&customer.medical),
            taboo: text(&customer.taboo),
            height: customer.height.map(|h| h.to_string()).unwrap_or_default(),
            memo: text(&customer.memo),
            is_active: customer.is_active,
            field_index: 0,
            error: None,
            first_posture_group_id: customer.first_posture_group_id.clone(),
        }
    }

    pub fn current_field(&self) -> FormField {
        FormField::ALL[self.field_index % FormField::ALL.len()]
    }

    pub fn next_field(&mut self) {
        self.field_index = (self.field_index + 1) % FormField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        self.field_index = (self.field_index + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    fn text_field_mut(&mut self) -> Option<&mut String> {
        match self.current_field() {
            FormField::Name => Some(&mut self.name),
            FormField::Kana => Some(&mut self.kana),
            FormField::Birthday => Some(&mut self.birthday),
            FormField::Email => Some(&mut self.email),
            FormField::Phone => Some(&mut self.phone),
            FormField::Address => Some(&mut self.address),
            FormField::Medical => Some(&mut self.medical),
            FormField::Taboo => Some(&mut self.taboo),
            FormField::Height => Some(&mut self.height),
            FormField::Memo => Some(&mut self.memo),
            FormField::Gender | FormField::Active => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.text_field_mut() {
            field.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.text_field_mut() {
            field.pop();
        }
    }

    /// Space on a choice field: cycle gender / toggle active.
    pub fn toggle_value(&mut self) {
        match self.current_field() {
            FormField::Gender => self.gender = self.gender.cycle(),
            FormField::Active => self.is_active = !self.is_active,
            _ => {}
        }
    }

    pub fn field_value(&self, field: FormField) -> String {
        match field {
            FormField::Name => self.name.clone(),
            FormField::Kana => self.kana.clone(),
            FormField::Gender => self.gender.display().to_string(),
            FormField::Birthday => self.birthday.clone(),
            FormField::Email => self.email.clone(),
            FormField::Phone => self.phone.clone(),
            FormField::Address => self.address.clone(),
            FormField::Medical => self.medical.clone(),
            FormField::Taboo => self.taboo.clone(),
            FormField::Height => self.height.clone(),
            FormField::Memo => self.memo.clone(),
            FormField::Active => if self.is_active { "yes" } else { "no" }.to_string(),
        }
    }

    /// Validate and translate into a repository input.
    pub fn to_input(&self) -> std::result::Result<CustomerInput, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let kana = self.kana.trim();
        if kana.is_empty() {
            return Err("Kana is required".to_string());
        }

        let birthday = match self.birthday.trim() {
            "" => None,
            value => Some(
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|_| "Birthday must be YYYY-MM-DD".to_string())?,
            ),
        };

        let height = match self.height.trim() {
            "" => None,
            value => Some(
                value
                    .parse::<f64>()
                    .map_err(|_| "Height must be a number".to_string())?,
            ),
        };

        let optional = |value: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        Ok(CustomerInput {
            name: name.to_string(),
            kana: kana.to_string(),
            gender: self.gender,
            birthday,
            email: optional(&self.email),
            phone: optional(&self.phone),
            address: optional(&self.address),
            medical: optional(&self.medical),
            taboo: optional(&self.taboo),
            height,
            memo: optional(&self.memo),
            first_posture_group_id: self.first_posture_group_id.clone(),
            is_active: self.is_active,
        })
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background fetch tasks back to the main loop.
/// History/customer/home variants carry the sequence number of the fetch
/// that produced them; stale sequences are discarded on receipt.
enum FetchResult {
    Stores(std::result::Result<Vec<Store>, String>),
    Home {
        seq: u64,
        result: std::result::Result<HomeView, String>,
    },
    History {
        seq: u64,
        result: std::result::Result<Vec<Lesson>, String>,
    },
    Customers {
        seq: u64,
        result: std::result::Result<Vec<Customer>, String>,
    },
}

/// Role-normalized home screen content.
pub struct HomeView {
    pub recent: Vec<Lesson>,
    pub upcoming: Vec<Lesson>,
    pub total_lessons: i64,
    pub chart: Vec<ChartBucket>,
    pub chart_scale: usize,
}

impl HomeView {
    /// Admin/manager variant: the home API did the aggregation.
    fn from_response(response: HomeResponse) -> Self {
        let chart: Vec<ChartBucket> = response
            .chart_data
            .series
            .into_iter()
            .map(|point| ChartBucket {
                label: point.period,
                count: point.count.max(0) as usize,
            })
            .collect();
        let scale = (response.chart_data.max_count.max(0) as usize).max(MIN_CHART_SCALE);

        Self {
            recent: response
                .recent_lessons
                .into_iter()
                .filter_map(|l| l.into_lesson())
                .collect(),
            upcoming: response
                .upcoming_lessons
                .into_iter()
                .filter_map(|l| l.into_lesson())
                .collect(),
            total_lessons: response.total_lesson_count,
            chart,
            chart_scale: scale,
        }
    }

    /// Trainer variant: derived locally from the trainer's own lessons.
    fn from_lessons(lessons: Vec<Lesson>, granularity: ChartGranularity) -> Self {
        let now = Utc::now();
        let (completed, mut upcoming): (Vec<Lesson>, Vec<Lesson>) =
            lessons.into_iter().partition(|l| l.is_completed(now));
        // The fetch is newest-first; upcoming reads soonest-first
        upcoming.sort_by_key(|l| l.start_date);
        upcoming.truncate(HOME_LESSON_COUNT);

        let chart = bucket_lessons(&completed, granularity);
        let scale = chart_scale(&chart);
        let total_lessons = completed.len() as i64;

        Self {
            recent: completed.into_iter().take(HOME_LESSON_COUNT).collect(),
            upcoming,
            total_lessons,
            chart,
            chart_scale: scale,
        }
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    api: ApiClient,
    store_directory: Option<Arc<StoreDirectory>>,
    customer_repo: Option<CustomerRepository>,
    pub principal: Option<Principal>,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,
    pub granularity: ChartGranularity,
    pub history_filter: StoreFilter,
    pub form: Option<CustomerForm>,
    pub pending_delete: Option<(String, String)>,
    pub detail_route: Option<String>,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Selections and paging
    pub home_selection: usize,
    pub customer_selection: usize,
    pub history_selection: usize,
    pub customer_pager: Pager,
    pub history_pager: Pager,

    // Fetched data and per-feed status
    pub store_list: Vec<Store>,
    pub store_error: Option<String>,
    pub store_loading: bool,
    pub store_age: Option<String>,
    pub home: Option<HomeView>,
    pub home_error: Option<String>,
    pub home_loading: bool,
    pub lessons: Vec<Lesson>,
    pub history_error: Option<String>,
    pub history_loading: bool,
    pub customers: Vec<Customer>,
    pub customers_error: Option<String>,
    pub customers_loading: bool,

    // Stale-response guards, one per feed
    home_guard: RequestGuard,
    history_guard: RequestGuard,
    customers_guard: RequestGuard,

    // Background task channel
    fetch_rx: mpsc::Receiver<FetchResult>,
    fetch_tx: mpsc::Sender<FetchResult>,

    pub status_message: Option<String>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let state_dir = Config::state_dir().context("Could not resolve state directory")?;
        let mut session = Session::new(state_dir);
        let restored = session.load().unwrap_or(false);

        let api = ApiClient::new(&config)?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = std::env::var("LESSONDESK_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let login_password = std::env::var("LESSONDESK_PASSWORD").unwrap_or_default();

        let mut app = Self {
            config,
            session,
            api,
            store_directory: None,
            customer_repo: None,
            principal: None,

            state: AppState::Normal,
            current_tab: Tab::Home,
            focus: Focus::List,
            search_query: String::new(),
            granularity: ChartGranularity::Week,
            history_filter: StoreFilter::All,
            form: None,
            pending_delete: None,
            detail_route: None,

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            home_selection: 0,
            customer_selection: 0,
            history_selection: 0,
            customer_pager: Pager::new(),
            history_pager: Pager::new(),

            store_list: Vec::new(),
            store_error: None,
            store_loading: false,
            store_age: None,
            home: None,
            home_error: None,
            home_loading: false,
            lessons: Vec::new(),
            history_error: None,
            history_loading: false,
            customers: Vec::new(),
            customers_error: None,
            customers_loading: false,

            home_guard: RequestGuard::default(),
            history_guard: RequestGuard::default(),
            customers_guard: RequestGuard::default(),

            fetch_rx: rx,
            fetch_tx: tx,

            status_message: None,
        };

        if restored {
            app.on_authenticated();
        }

        Ok(app)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        // Offer the stored password for the remembered account
        if self.login_password.is_empty() && !self.login_email.is_empty() {
            if let Ok(password) = CredentialStore::get_password(&self.login_email) {
                self.login_password = password;
            }
        }
    }

    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.clone();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        match self.api.sign_in(&email, &password).await {
            Ok(session_data) => {
                if let Err(e) = CredentialStore::store(&email, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.session.update(session_data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                self.on_authenticated();
                self.refresh_all();
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let message = e.to_string();
                self.login_error = Some(if message.to_lowercase().contains("unauthorized") {
                    "Invalid email or password".to_string()
                } else {
                    message.clone()
                });
                Err(e)
            }
        }
    }

    /// Wire up the authenticated services: token on the client, the
    /// process-wide store directory, and the customer repository.
    fn on_authenticated(&mut self) {
        let Some(data) = self.session.data.clone() else {
            return;
        };
        let authed = self.api.with_token(Arc::new(data.access_token.clone()));
        self.store_directory = Some(Arc::new(StoreDirectory::new(Arc::new(authed.clone()))));
        self.customer_repo = Some(CustomerRepository::new(authed.clone()));
        self.api = authed;
        self.principal = Some(data.principal());
    }

    // =========================================================================
    // Background refresh
    // =========================================================================

    pub fn refresh_all(&mut self) {
        self.refresh_stores(false);
        self.refresh_home();
        self.refresh_history();
        self.refresh_customers();
    }

    pub fn refresh_stores(&mut self, force: bool) {
        let Some(directory) = self.store_directory.clone() else {
            return;
        };
        self.store_loading = true;
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = if force {
                directory.refetch().await
            } else {
                directory.get(false).await
            };
            // A closed channel means the app is tearing down
            let _ = tx.send(FetchResult::Stores(result)).await;
        });
    }

    pub fn refresh_home(&mut self) {
        let Some(principal) = self.principal.clone() else {
            return;
        };
        let seq = self.home_guard.begin();
        self.home_loading = true;
        let api = self.api.clone();
        let granularity = self.granularity;
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = Self::load_home(api, principal, granularity)
                .await
                .map_err(|e| format!("{:#}", e));
            let _ = tx.send(FetchResult::Home { seq, result }).await;
        });
    }

    async fn load_home(
        api: ApiClient,
        principal: Principal,
        granularity: ChartGranularity,
    ) -> Result<HomeView> {
        let query = HomeQuery {
            chart_type: granularity,
            page: 0,
            size: HOME_LESSON_COUNT,
        };
        match principal.role {
            Role::Admin => Ok(HomeView::from_response(api.fetch_admin_home(query).await?)),
            Role::Manager => {
                let store_id = principal
                    .store_ids
                    .first()
                    .context("Manager has no store assignment")?;
                Ok(HomeView::from_response(
                    api.fetch_manager_home(store_id, query).await?,
                ))
            }
            Role::Trainer => {
                let rows = api
                    .fetch_lesson_rows(history::trainer_home_query(&principal))
                    .await?;
                Ok(HomeView::from_lessons(
                    history::normalize_rows(rows),
                    granularity,
                ))
            }
        }
    }

    pub fn refresh_history(&mut self) {
        let Some(principal) = self.principal.clone() else {
            return;
        };
        let seq = self.history_guard.begin();
        self.history_loading = true;
        let api = self.api.clone();
        let query = history::history_query(&principal, &self.history_filter, Utc::now());
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api
                .fetch_lesson_rows(query)
                .await
                .map(history::normalize_rows)
                .map_err(|e| format!("{:#}", e));
            let _ = tx.send(FetchResult::History { seq, result }).await;
        });
    }

    pub fn refresh_customers(&mut self) {
        let Some(repo) = self.customer_repo.clone() else {
            return;
        };
        let seq = self.customers_guard.begin();
        self.customers_loading = true;
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = repo.list().await.map_err(|e| format!("{:#}", e));
            let _ = tx.send(FetchResult::Customers { seq, result }).await;
        });
    }

    /// Drain completed background work. Called from the main loop tick.
    pub async fn check_background_tasks(&mut self) {
        while let Ok(result) = self.fetch_rx.try_recv() {
            match result {
                FetchResult::Stores(Ok(stores)) => {
                    self.store_loading = false;
                    self.store_list = stores;
                    self.store_error = None;
                }
                FetchResult::Stores(Err(message)) => {
                    // Keep whatever list we had; stale beats empty
                    self.store_loading = false;
                    self.store_error = Some(message);
                }
                FetchResult::Home { seq, result } => {
                    if !self.home_guard.is_current(seq) {
                        continue;
                    }
                    self.home_loading = false;
                    match result {
                        Ok(view) => {
                            self.home = Some(view);
                            self.home_error = None;
                        }
                        Err(message) => self.home_error = Some(message),
                    }
                }
                FetchResult::History { seq, result } => {
                    if !self.history_guard.is_current(seq) {
                        continue;
                    }
                    self.history_loading = false;
                    match result {
                        Ok(lessons) => {
                            self.lessons = lessons;
                            self.history_error = None;
                            self.history_pager.clamp(self.lessons.len());
                            self.history_selection = 0;
                        }
                        Err(message) => self.history_error = Some(message),
                    }
                }
                FetchResult::Customers { seq, result } => {
                    if !self.customers_guard.is_current(seq) {
                        continue;
                    }
                    self.customers_loading = false;
                    match result {
                        Ok(customers) => {
                            self.customers = customers;
                            self.customers_error = None;
                            self.clamp_customer_view();
                        }
                        Err(message) => self.customers_error = Some(message),
                    }
                }
            }
        }

        if let Some(directory) = &self.store_directory {
            self.store_age = directory.cached().await.map(|entry| entry.age_display());
        }
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    pub fn filtered_customers(&self) -> Vec<&Customer> {
        customers::search(&self.customers, &self.search_query)
    }

    pub fn visible_customers(&self) -> Vec<&Customer> {
        let filtered = self.filtered_customers();
        page_slice(&filtered, self.customer_pager.current(), PAGE_SIZE).to_vec()
    }

    pub fn selected_customer(&self) -> Option<&Customer> {
        self.visible_customers().get(self.customer_selection).copied()
    }

    pub fn visible_history(&self) -> &[Lesson] {
        page_slice(&self.lessons, self.history_pager.current(), PAGE_SIZE)
    }

    pub fn selected_history_lesson(&self) -> Option<&Lesson> {
        self.visible_history().get(self.history_selection)
    }

    /// Chart buckets for the history tab, derived from the loaded page
    /// set under the current granularity.
    pub fn history_chart(&self) -> (Vec<ChartBucket>, usize) {
        let buckets = bucket_lessons(&self.lessons, self.granularity);
        let scale = chart_scale(&buckets);
        (buckets, scale)
    }

    /// Label for the current history store filter.
    pub fn history_filter_label(&self) -> String {
        match &self.history_filter {
            StoreFilter::All => match self.principal.as_ref().map(|p| p.role) {
                Some(Role::Manager) => "My stores".to_string(),
                _ => "All stores".to_string(),
            },
            StoreFilter::Store(id) => self
                .store_list
                .iter()
                .find(|s| &s.id == id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| id.clone()),
        }
    }

    fn clamp_customer_view(&mut self) {
        let count = self.filtered_customers().len();
        self.customer_pager.clamp(count);
        let page_start = (self.customer_pager.current() - 1) * PAGE_SIZE;
        let visible = count.saturating_sub(page_start).min(PAGE_SIZE);
        if self.customer_selection >= visible {
            self.customer_selection = visible.saturating_sub(1);
        }
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// Search text changed: the filter resets pagination to page 1.
    pub fn set_search_query(&mut self, query: String) {
        self.search_query = query;
        self.customer_pager.reset();
        self.customer_selection = 0;
    }

    /// Admin-only store filter cycling: All -> each store -> All.
    /// Managers are query-pinned to their own stores, so cycling is a
    /// no-op for them.
    pub fn cycle_history_filter(&mut self) {
        let Some(principal) = &self.principal else {
            return;
        };
        if principal.role != Role::Admin {
            return;
        }

        let next = match &self.history_filter {
            StoreFilter::All => self.store_list.first().map(|s| s.id.clone()),
            StoreFilter::Store(current) => {
                let index = self.store_list.iter().position(|s| &s.id == current);
                match index {
                    Some(i) if i + 1 < self.store_list.len() => {
                        Some(self.store_list[i + 1].id.clone())
                    }
                    _ => None,
                }
            }
        };

        self.history_filter = match next {
            Some(id) => StoreFilter::Store(id),
            None => StoreFilter::All,
        };
        // Changing the filter resets pagination and refetches
        self.history_pager.reset();
        self.history_selection = 0;
        self.refresh_history();
    }

    pub fn toggle_granularity(&mut self) {
        self.granularity = self.granularity.toggle();
        // Home chart data comes pre-bucketed from the API
        self.refresh_home();
    }

    pub fn history_page_next(&mut self) {
        self.history_pager.next(self.lessons.len());
        self.history_selection = 0;
    }

    pub fn history_page_prev(&mut self) {
        self.history_pager.prev();
        self.history_selection = 0;
    }

    pub fn customer_page_next(&mut self) {
        let count = self.filtered_customers().len();
        self.customer_pager.next(count);
        self.customer_selection = 0;
    }

    pub fn customer_page_prev(&mut self) {
        self.customer_pager.prev();
        self.customer_selection = 0;
    }

    /// Resolve the role/origin route for the activated lesson and focus
    /// the detail pane.
    pub fn activate_lesson(&mut self, origin: Origin) {
        let Some(principal) = &self.principal else {
            return;
        };
        let lesson = match origin {
            Origin::Home => self
                .home
                .as_ref()
                .and_then(|view| view.recent.get(self.home_selection)),
            Origin::History => self.selected_history_lesson(),
        };
        let Some(lesson) = lesson else {
            return;
        };
        let Some(customer_id) = lesson.customer_id.as_deref() else {
            self.status_message = Some("Lesson has no customer attached".to_string());
            return;
        };
        self.detail_route = Some(lesson_detail_path(
            principal.role,
            origin,
            customer_id,
            &lesson.id,
        ));
        self.focus = Focus::Detail;
    }

    pub fn open_new_customer_form(&mut self) {
        self.form = Some(CustomerForm::blank());
        self.state = AppState::EditingCustomer;
    }

    pub fn open_edit_customer_form(&mut self) {
        if let Some(customer) = self.selected_customer() {
            self.form = Some(CustomerForm::for_edit(customer));
            self.state = AppState::EditingCustomer;
        }
    }

    /// Submit the customer form. On failure the overlay stays open and
    /// shows the error; on success the refreshed list replaces the view.
    pub async fn submit_customer_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };
        let Some(repo) = self.customer_repo.clone() else {
            return;
        };

        let input = match form.to_input() {
            Ok(input) => input,
            Err(message) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(message);
                }
                return;
            }
        };

        let result = match &form.editing_id {
            Some(id) => repo.update(id, &input).await,
            None => repo.create(&input).await,
        };

        match result {
            Ok(customers) => {
                self.customers = customers;
                self.customers_error = None;
                self.form = None;
                self.state = AppState::Normal;
                self.status_message = Some("Customer saved".to_string());
                self.clamp_customer_view();
            }
            Err(e) => {
                error!(error = %e, "Customer save failed");
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(format!("{:#}", e));
                }
            }
        }
    }

    /// Ask for confirmation before the destructive call goes out.
    pub fn request_delete_customer(&mut self) {
        if let Some(customer) = self.selected_customer() {
            self.pending_delete = Some((customer.id.clone(), customer.name.clone()));
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub async fn confirm_delete_customer(&mut self) {
        let Some((id, name)) = self.pending_delete.take() else {
            self.state = AppState::Normal;
            return;
        };
        self.state = AppState::Normal;
        let Some(repo) = self.customer_repo.clone() else {
            return;
        };

        match repo.delete(&id).await {
            Ok(customers) => {
                self.customers = customers;
                self.customers_error = None;
                self.status_message = Some(format!("Deleted {}", name));
                self.clamp_customer_view();
            }
            Err(e) => {
                error!(error = %e, customer = %id, "Customer delete failed");
                self.status_message = Some(format!("{:#}", e));
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }
}
