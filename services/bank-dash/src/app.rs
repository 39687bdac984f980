// services/bank-dash/src/app.rs
//
// Page lifecycle, key bindings and event application. The App is owned by
// the UI thread; backend work goes through the Loader.
//

use std::time::Instant;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::config::DashboardSettings;
use crate::forms::Form;
use crate::loader::{AppEvent, Loader};
use crate::poll::Poller;
use crate::state::{
    DashboardView, DonationView, DonorView, Lookups, Page, RequestView, ScreeningView, StockView,
};
use crate::toast::{ToastKind, Toasts};

pub struct App {
    page: Page,
    loader: Loader,
    settings: DashboardSettings,
    poller: Option<Poller>,
    form: Option<Form>,
    /// Bumped every time a form opens; submissions carry it back.
    form_id: u64,
    /// Highlighted row on list pages.
    selected: usize,
    searching: bool,
    should_quit: bool,

    pub toasts: Toasts,
    pub lookups: Lookups,
    pub dashboard: DashboardView,
    pub donors: DonorView,
    pub donations: DonationView,
    pub requests: RequestView,
    pub stock: StockView,
    pub screenings: ScreeningView,
}

impl App {
    pub fn new(loader: Loader, settings: DashboardSettings) -> Self {
        Self {
            page: Page::Dashboard,
            toasts: Toasts::new(settings.toast_ttl()),
            dashboard: DashboardView::new(settings.recent_requests),
            loader,
            settings,
            poller: None,
            form: None,
            form_id: 0,
            selected: 0,
            searching: false,
            should_quit: false,
            lookups: Lookups::default(),
            donors: DonorView::new(),
            donations: DonationView::new(),
            requests: RequestView::new(),
            stock: StockView::new(),
            screenings: ScreeningView::new(),
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn backend_name(&self) -> &str {
        self.loader.backend_name()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().map_or(false, Poller::is_running)
    }

    /// Leaves the current page and bootstraps `page`: fresh view state,
    /// dropdown lookups, the primary list, then the poller.
    pub fn enter_page(&mut self, page: Page) {
        // dropping the old poller aborts it
        self.poller = None;
        self.form = None;
        self.searching = false;
        self.selected = 0;
        self.page = page;
        self.reset_view(page);
        info!("Entering {} page", page);

        match page {
            Page::Donations => {
                self.loader.load_active_donors();
                self.loader.load_banks();
            }
            Page::Requests => self.loader.load_hospitals(),
            Page::Stock => self.loader.load_banks(),
            Page::Screenings => self.loader.load_active_donors(),
            Page::Dashboard | Page::Donors => {}
        }
        self.reload();

        self.poller = Some(Poller::start(
            self.loader.handle(),
            page,
            self.settings.poll_interval(),
            self.loader.sender(),
        ));
    }

    fn reset_view(&mut self, page: Page) {
        match page {
            Page::Dashboard => self.dashboard = DashboardView::new(self.settings.recent_requests),
            Page::Donors => self.donors = DonorView::new(),
            Page::Donations => self.donations = DonationView::new(),
            Page::Requests => self.requests = RequestView::new(),
            Page::Stock => self.stock = StockView::new(),
            Page::Screenings => self.screenings = ScreeningView::new(),
        }
    }

    /// Re-fetches the active page's primary list with its current filters.
    pub fn reload(&mut self) {
        match self.page {
            Page::Dashboard => self.loader.load_dashboard(),
            Page::Donors => self.loader.load_donors(self.donors.query()),
            Page::Donations => self.loader.load_donations(),
            Page::Requests => self.loader.load_requests(self.requests.filter()),
            Page::Stock => self.loader.load_stock(self.stock.filter()),
            Page::Screenings => self.loader.load_screenings(),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.toasts.prune(now);
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Dashboard(result) => self.dashboard.apply_summary(result, &mut self.toasts),
            AppEvent::RecentRequests(result) => self.dashboard.apply_recent(result),
            AppEvent::Donors(result) => self.donors.apply_donors(result, &mut self.toasts),
            AppEvent::Donations(result) => {
                self.donations.apply_donations(result, &mut self.toasts)
            }
            AppEvent::Requests(result) => self.requests.apply_requests(result, &mut self.toasts),
            AppEvent::Stock(result) => self.stock.apply_stock(result, &mut self.toasts),
            AppEvent::Screenings(result) => self.screenings.apply_batch(result, &mut self.toasts),
            AppEvent::Banks(result) => self.lookups.apply_banks(result),
            AppEvent::Hospitals(result) => self.lookups.apply_hospitals(result),
            AppEvent::ActiveDonors(result) => self.lookups.apply_active_donors(result),
            AppEvent::DonorDetails(result) => match result {
                Ok(donor) => self.open_form(Form::edit_donor(&donor)),
                Err(e) => {
                    warn!("Error loading donor details: {}", e);
                    self.toasts.error("Error loading donor details");
                }
            },
            AppEvent::Submitted {
                form_id,
                submission,
                result,
            } => match result {
                Ok(created) => {
                    info!("{:?} accepted", submission);
                    if self.owns_form(form_id) {
                        self.form = None;
                    }
                    let ttl = if submission.wants_long_toast() {
                        self.settings.screening_toast_ttl()
                    } else {
                        self.settings.toast_ttl()
                    };
                    self.toasts
                        .push(ToastKind::Success, submission.success_message(&created), ttl);
                    if submission.reloads() == self.page {
                        self.reload();
                    }
                }
                Err(e) => {
                    warn!("Submission failed: {}", e);
                    if self.owns_form(form_id) {
                        if let Some(form) = self.form.as_mut() {
                            form.set_submitting(false);
                        }
                    }
                    self.toasts.error(e.user_message(submission.failure_fallback()));
                }
            },
            AppEvent::Poll(page) => {
                if page == self.page {
                    self.reload();
                }
            }
        }
    }

    fn row_count(&self) -> usize {
        match self.page {
            Page::Donors => self.donors.visible().len(),
            Page::Donations => self.donations.donations().len(),
            Page::Requests => self.requests.requests().len(),
            Page::Screenings => self.screenings.screenings().len(),
            Page::Stock => self.stock.stock().len(),
            Page::Dashboard => 0,
        }
    }

    fn move_selection(&mut self, down: bool) {
        let count = self.row_count();
        if count == 0 {
            self.selected = 0;
        } else if down {
            self.selected = (self.selected + 1).min(count - 1);
        } else {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    fn open_form(&mut self, form: Form) {
        self.form_id += 1;
        self.form = Some(form);
    }

    /// True while the form that produced submission `form_id` is still open.
    fn owns_form(&self, form_id: u64) -> bool {
        self.form.is_some() && self.form_id == form_id
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.is_submitting() {
            return;
        }
        match form.payload() {
            Ok(submission) => {
                form.set_submitting(true);
                self.loader.submit(self.form_id, submission);
            }
            Err(e) => self.toasts.error(e.user_message("Please check the form")),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.form.is_some() {
            self.handle_form_key(key.code);
        } else if self.searching {
            self.handle_search_key(key.code);
        } else {
            self.handle_page_key(key.code);
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        if code == KeyCode::Enter {
            self.submit_form();
            return;
        }
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.form = None,
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left => form.cycle_select(false),
            KeyCode::Right => form.cycle_select(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.input_char(c),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Esc => self.searching = false,
            KeyCode::Backspace => self.donors.pop_search_char(),
            KeyCode::Char(c) => self.donors.push_search_char(c),
            _ => {}
        }
        self.selected = 0;
    }

    fn handle_page_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => return self.enter_page(self.page.next()),
            KeyCode::BackTab => return self.enter_page(self.page.previous()),
            KeyCode::Char(c @ '1'..='6') => {
                let index = (c as usize) - ('1' as usize);
                return self.enter_page(Page::ALL[index]);
            }
            KeyCode::Char('r') => return self.reload(),
            KeyCode::Up => return self.move_selection(false),
            KeyCode::Down => return self.move_selection(true),
            _ => {}
        }

        let today = Local::now().date_naive();
        match (self.page, code) {
            (Page::Donors, KeyCode::Char('/')) => self.searching = true,
            (Page::Donors, KeyCode::Char('g')) => {
                let query = self.donors.cycle_blood_group();
                self.selected = 0;
                self.loader.load_donors(query);
            }
            (Page::Donors, KeyCode::Char('n')) => self.open_form(Form::register_donor()),
            (Page::Donors, KeyCode::Char('e')) => {
                if let Some(donor) = self.donors.donor_at(self.selected) {
                    self.loader.load_donor_details(donor.donor_id);
                }
            }
            (Page::Donations, KeyCode::Char('n')) => {
                self.open_form(Form::record_donation(&self.lookups, today))
            }
            (Page::Requests, KeyCode::Char('s')) => {
                let query = self.requests.cycle_status();
                self.selected = 0;
                self.loader.load_requests(query);
            }
            (Page::Requests, KeyCode::Char('g')) => {
                let query = self.requests.cycle_blood_group();
                self.selected = 0;
                self.loader.load_requests(query);
            }
            (Page::Requests, KeyCode::Char('n')) => {
                self.open_form(Form::create_request(&self.lookups))
            }
            (Page::Requests, KeyCode::Char('u')) => {
                if let Some(request) = self.requests.request_at(self.selected) {
                    let form = Form::update_request_status(request.request_id, request.status);
                    self.open_form(form);
                }
            }
            (Page::Stock, KeyCode::Left) => self.stock.move_cursor(false),
            (Page::Stock, KeyCode::Right) => self.stock.move_cursor(true),
            (Page::Stock, KeyCode::Enter) | (Page::Stock, KeyCode::Char('s')) => {
                self.stock.click_cursor()
            }
            (Page::Stock, KeyCode::Char('x')) => self.stock.clear_sort(),
            (Page::Stock, KeyCode::Char('g')) => {
                let query = self.stock.cycle_blood_group();
                self.loader.load_stock(query);
            }
            (Page::Stock, KeyCode::Char('b')) => {
                let query = self.stock.cycle_bank(&self.lookups.banks);
                self.loader.load_stock(query);
            }
            (Page::Stock, KeyCode::Char('c')) => {
                let query = self.stock.clear_filter();
                self.loader.load_stock(query);
            }
            (Page::Screenings, KeyCode::Char('n')) => {
                self.open_form(Form::record_screening(&self.lookups, today))
            }
            _ => {}
        }
    }
}
