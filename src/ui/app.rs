use std::mem;

use anyhow::{Error, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{debug, error, warn};

use crate::db::{
    assign_instructor, create_course, create_instructor, create_student, delete_course,
    delete_instructor, delete_student, fetch_course_listings, fetch_courses, fetch_enrollments,
    fetch_instructors, fetch_students, filter_course_listings, filter_instructors,
    filter_students, register_student_course, unregister_student_course, update_course,
    update_instructor, update_student,
};
use crate::error::SchoolError;
use crate::models::{CourseListing, Enrollment, Instructor, Student};

use super::forms::{
    Choice, ConfirmDelete, CourseField, CourseForm, DeleteTarget, PairAction, PairForm,
    PersonField, PersonForm, PersonKind,
};
use super::helpers::{centered_rect, key_hints, surface_error};
use super::screens::{filter_enrollments, ListScreen, Navigable, Tab};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the tab strip at the top of the screen.
const TAB_BAR_HEIGHT: u16 = 3;
/// Rows skipped by PgUp/PgDn.
const PAGE_STEP: isize = 5;

/// Fine-grained modes layered over the active tab.
enum Mode {
    Normal,
    AddingPerson {
        kind: PersonKind,
        form: PersonForm,
    },
    EditingPerson {
        kind: PersonKind,
        id: i64,
        form: PersonForm,
    },
    AddingCourse(CourseForm),
    EditingCourse {
        id: i64,
        form: CourseForm,
    },
    Pairing(PairForm),
    ConfirmDelete(ConfirmDelete),
    Filtering(FilterState),
}

/// State for an active filter bar.
struct FilterState {
    query: String,
}

/// Row to keep the cursor on after a write.
#[derive(Copy, Clone)]
enum Focus {
    Nothing,
    Student(i64),
    Instructor(i64),
    Course(i64),
    Enrollment(i64, i64),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    tab: Tab,
    students: ListScreen<Student>,
    instructors: ListScreen<Instructor>,
    courses: ListScreen<CourseListing>,
    enrollments: ListScreen<Enrollment>,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Take ownership of the connection and load every tab.
    pub fn new(conn: Connection) -> Result<Self> {
        let students = ListScreen::new(fetch_students(&conn)?);
        let instructors = ListScreen::new(fetch_instructors(&conn)?);
        let courses = ListScreen::new(fetch_course_listings(&conn)?);
        let enrollments = ListScreen::new(fetch_enrollments(&conn)?);
        Ok(Self {
            conn,
            tab: Tab::Students,
            students,
            instructors,
            courses,
            enrollments,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Dispatch a key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingPerson { kind, form } => self.handle_person_form(code, kind, None, form)?,
            Mode::EditingPerson { kind, id, form } => {
                self.handle_person_form(code, kind, Some(id), form)?
            }
            Mode::AddingCourse(form) => self.handle_course_form(code, None, form)?,
            Mode::EditingCourse { id, form } => self.handle_course_form(code, Some(id), form)?,
            Mode::Pairing(form) => self.handle_pair_form(code, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Filtering(state) => self.handle_filter(code, state)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.current_filter().is_some() {
                    self.apply_filter(None)?;
                    self.set_status("Filter cleared.", StatusKind::Info);
                } else {
                    self.clear_status();
                }
            }
            KeyCode::Tab | KeyCode::Right => self.switch_tab(self.tab.offset(1)),
            KeyCode::BackTab | KeyCode::Left => self.switch_tab(self.tab.offset(-1)),
            KeyCode::Char(ch @ '1'..='4') => {
                let idx = ch as usize - '1' as usize;
                self.switch_tab(Tab::ALL[idx]);
            }
            KeyCode::Up => self.cursor().move_selection(-1),
            KeyCode::Down => self.cursor().move_selection(1),
            KeyCode::PageUp => self.cursor().move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.cursor().move_selection(PAGE_STEP),
            KeyCode::Home => self.cursor().select_first(),
            KeyCode::End => self.cursor().select_last(),
            KeyCode::Char('+') => {
                self.clear_status();
                return self.open_add_form();
            }
            KeyCode::Char('e') | KeyCode::Char('E') => return self.open_edit_form(),
            KeyCode::Char('-') => return Ok(self.open_delete_confirm()),
            KeyCode::Char('f') | KeyCode::Char('/') => {
                let query = self.current_filter().unwrap_or_default().to_string();
                return Ok(Mode::Filtering(FilterState { query }));
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                return self.open_pair_form(PairAction::Register);
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return self.open_pair_form(PairAction::AssignInstructor);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn open_add_form(&mut self) -> Result<Mode> {
        Ok(match self.tab {
            Tab::Students => Mode::AddingPerson {
                kind: PersonKind::Student,
                form: PersonForm::default(),
            },
            Tab::Instructors => Mode::AddingPerson {
                kind: PersonKind::Instructor,
                form: PersonForm::default(),
            },
            Tab::Courses => Mode::AddingCourse(CourseForm::new(self.instructor_choices()?)),
            Tab::Enrollments => return self.open_pair_form(PairAction::Register),
        })
    }

    fn open_edit_form(&mut self) -> Result<Mode> {
        let mode = match self.tab {
            Tab::Students => self.students.current().map(|s| Mode::EditingPerson {
                kind: PersonKind::Student,
                id: s.id,
                form: PersonForm::from_student(s),
            }),
            Tab::Instructors => self.instructors.current().map(|i| Mode::EditingPerson {
                kind: PersonKind::Instructor,
                id: i.id,
                form: PersonForm::from_instructor(i),
            }),
            Tab::Courses => match self.courses.current().map(|l| l.course.clone()) {
                Some(course) => Some(Mode::EditingCourse {
                    id: course.id,
                    form: CourseForm::from_course(&course, self.instructor_choices()?),
                }),
                None => None,
            },
            Tab::Enrollments => {
                self.set_status(
                    "Enrollments cannot be edited. Unregister with '-' and register again.",
                    StatusKind::Error,
                );
                return Ok(Mode::Normal);
            }
        };

        match mode {
            Some(mode) => {
                self.clear_status();
                Ok(mode)
            }
            None => {
                self.set_status("Nothing selected to edit.", StatusKind::Error);
                Ok(Mode::Normal)
            }
        }
    }

    fn open_delete_confirm(&mut self) -> Mode {
        let confirm = match self.tab {
            Tab::Students => self.students.current().map(|s| {
                ConfirmDelete::new(
                    DeleteTarget::Person {
                        kind: PersonKind::Student,
                        id: s.id,
                    },
                    format!("student {s}"),
                )
            }),
            Tab::Instructors => self.instructors.current().map(|i| {
                ConfirmDelete::new(
                    DeleteTarget::Person {
                        kind: PersonKind::Instructor,
                        id: i.id,
                    },
                    format!("instructor {i}"),
                )
            }),
            Tab::Courses => self.courses.current().map(|l| {
                ConfirmDelete::new(
                    DeleteTarget::Course { id: l.course.id },
                    format!("course {}", l.course),
                )
            }),
            Tab::Enrollments => self.enrollments.current().map(|e| {
                ConfirmDelete::new(
                    DeleteTarget::Enrollment {
                        student_id: e.student_id,
                        course_id: e.course_id,
                    },
                    format!("{} from {}", e.student_name, e.course_name),
                )
            }),
        };

        match confirm {
            Some(confirm) => {
                self.clear_status();
                Mode::ConfirmDelete(confirm)
            }
            None => {
                self.set_status("Nothing selected to delete.", StatusKind::Error);
                Mode::Normal
            }
        }
    }

    /// Build a registration or assignment dialog, preselecting whatever row
    /// is under the cursor on the current tab.
    fn open_pair_form(&mut self, action: PairAction) -> Result<Mode> {
        let courses: Vec<Choice> = fetch_courses(&self.conn)?.iter().map(Choice::course).collect();
        let first: Vec<Choice> = match action {
            PairAction::Register => fetch_students(&self.conn)?.iter().map(Choice::student).collect(),
            PairAction::AssignInstructor => self.instructor_choices()?,
        };
        let mut form = PairForm::new(action, first, courses);

        match (action, self.tab) {
            (PairAction::Register, Tab::Students) => {
                form.first.select_id(self.students.current().map(|s| s.id));
            }
            (PairAction::AssignInstructor, Tab::Instructors) => {
                form.first.select_id(self.instructors.current().map(|i| i.id));
            }
            (_, Tab::Courses) => {
                form.second.select_id(self.courses.current().map(|l| l.course.id));
                if action == PairAction::AssignInstructor {
                    form.first.select_id(self.courses.current().and_then(|l| l.course.instructor_id));
                }
            }
            _ => {}
        }

        Ok(Mode::Pairing(form))
    }

    fn handle_person_form(
        &mut self,
        code: KeyCode,
        kind: PersonKind,
        id: Option<i64>,
        mut form: PersonForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status(format!("{} form cancelled.", kind.label()), StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_person(kind, id, &form) {
                Ok(()) => keep_open = false,
                Err(err) => form.error = Some(self.report_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if !keep_open {
            return Ok(Mode::Normal);
        }
        Ok(match id {
            Some(id) => Mode::EditingPerson { kind, id, form },
            None => Mode::AddingPerson { kind, form },
        })
    }

    fn save_person(&mut self, kind: PersonKind, id: Option<i64>, form: &PersonForm) -> Result<()> {
        let (name, age, email) = form.parse_inputs()?;
        let (focus, verb) = match (kind, id) {
            (PersonKind::Student, None) => {
                let student = create_student(&self.conn, &name, age, &email)?;
                (Focus::Student(student.id), "added")
            }
            (PersonKind::Student, Some(id)) => {
                update_student(&self.conn, id, &name, age, &email)?;
                (Focus::Student(id), "updated")
            }
            (PersonKind::Instructor, None) => {
                let instructor = create_instructor(&self.conn, &name, age, &email)?;
                (Focus::Instructor(instructor.id), "added")
            }
            (PersonKind::Instructor, Some(id)) => {
                update_instructor(&self.conn, id, &name, age, &email)?;
                (Focus::Instructor(id), "updated")
            }
        };
        self.refresh(focus)?;
        self.set_status(
            format!("{} {verb} successfully.", kind.label()),
            StatusKind::Info,
        );
        Ok(())
    }

    fn handle_course_form(
        &mut self,
        code: KeyCode,
        id: Option<i64>,
        mut form: CourseForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Course form cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Up | KeyCode::Left => form.cycle(-1),
            KeyCode::Down | KeyCode::Right => form.cycle(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_course(id, &form) {
                Ok(()) => keep_open = false,
                Err(err) => form.error = Some(self.report_error(&err)),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if !keep_open {
            return Ok(Mode::Normal);
        }
        Ok(match id {
            Some(id) => Mode::EditingCourse { id, form },
            None => Mode::AddingCourse(form),
        })
    }

    fn save_course(&mut self, id: Option<i64>, form: &CourseForm) -> Result<()> {
        let (name, instructor_id) = form.parse_inputs()?;
        let (course_id, verb) = match id {
            Some(id) => {
                update_course(&self.conn, id, &name, instructor_id)?;
                (id, "updated")
            }
            None => (create_course(&self.conn, &name, instructor_id)?.id, "added"),
        };
        self.refresh(Focus::Course(course_id))?;
        self.set_status(format!("Course {verb} successfully."), StatusKind::Info);
        Ok(())
    }

    fn handle_pair_form(&mut self, code: KeyCode, mut form: PairForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status(format!("{} cancelled.", form.action.title()), StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                form.toggle_field()
            }
            KeyCode::Up => form.cycle(-1),
            KeyCode::Down => form.cycle(1),
            KeyCode::Enter => match self.submit_pair(&form) {
                Ok(()) => return Ok(Mode::Normal),
                Err(err) => form.error = Some(self.report_error(&err)),
            },
            _ => {}
        }
        Ok(Mode::Pairing(form))
    }

    fn submit_pair(&mut self, form: &PairForm) -> Result<()> {
        let (first, course_id) = form.parse_inputs()?;
        match form.action {
            PairAction::Register => {
                register_student_course(&self.conn, first, course_id)?;
                self.refresh(Focus::Enrollment(first, course_id))?;
                self.set_status(
                    "Student registered for course successfully.",
                    StatusKind::Info,
                );
            }
            PairAction::AssignInstructor => {
                assign_instructor(&self.conn, course_id, first)?;
                self.refresh(Focus::Course(course_id))?;
                self.set_status(
                    format!(
                        "Instructor {} assigned to {}!",
                        form.first.display(),
                        form.second.display()
                    ),
                    StatusKind::Info,
                );
            }
        }
        Ok(())
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, mut confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm.target) {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        confirm.error = Some(self.report_error(&err));
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn perform_delete(&mut self, target: &DeleteTarget) -> Result<()> {
        let message = match *target {
            DeleteTarget::Person {
                kind: PersonKind::Student,
                id,
            } => {
                delete_student(&self.conn, id)?;
                "Student deleted successfully."
            }
            DeleteTarget::Person {
                kind: PersonKind::Instructor,
                id,
            } => {
                delete_instructor(&self.conn, id)?;
                "Instructor deleted successfully."
            }
            DeleteTarget::Course { id } => {
                delete_course(&self.conn, id)?;
                "Course deleted successfully."
            }
            DeleteTarget::Enrollment {
                student_id,
                course_id,
            } => {
                unregister_student_course(&self.conn, student_id, course_id)?;
                "Student unregistered from course."
            }
        };
        self.refresh(Focus::Nothing)?;
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    /// Live filter: every keystroke re-runs the query for the current tab.
    fn handle_filter(&mut self, code: KeyCode, mut state: FilterState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.apply_filter(None)?;
                self.set_status("Filter cleared.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Backspace => {
                state.query.pop();
                self.apply_filter(Some(state.query.clone()))?;
            }
            KeyCode::Char(ch) => {
                state.query.push(ch);
                self.apply_filter(Some(state.query.clone()))?;
            }
            _ => {}
        }
        Ok(Mode::Filtering(state))
    }

    fn apply_filter(&mut self, filter: Option<String>) -> Result<()> {
        match self.tab {
            Tab::Students => self.students.filter = filter,
            Tab::Instructors => self.instructors.filter = filter,
            Tab::Courses => self.courses.filter = filter,
            Tab::Enrollments => self.enrollments.filter = filter,
        }
        self.reload_tab(self.tab, Focus::Nothing)
    }

    fn current_filter(&self) -> Option<&str> {
        match self.tab {
            Tab::Students => self.students.active_filter(),
            Tab::Instructors => self.instructors.active_filter(),
            Tab::Courses => self.courses.active_filter(),
            Tab::Enrollments => self.enrollments.active_filter(),
        }
    }

    /// Reload every tab after a write; any table may have been touched by a
    /// cascade or a renamed join target.
    fn refresh(&mut self, focus: Focus) -> Result<()> {
        for tab in Tab::ALL {
            self.reload_tab(tab, focus)?;
        }
        if let Some(tab) = focus_tab(focus) {
            self.tab = tab;
        }
        Ok(())
    }

    fn reload_tab(&mut self, tab: Tab, focus: Focus) -> Result<()> {
        match tab {
            Tab::Students => {
                let rows = match self.students.active_filter() {
                    Some(term) => filter_students(&self.conn, term)?,
                    None => fetch_students(&self.conn)?,
                };
                self.students
                    .set_rows_focused(rows, |s| matches!(focus, Focus::Student(id) if id == s.id));
            }
            Tab::Instructors => {
                let rows = match self.instructors.active_filter() {
                    Some(term) => filter_instructors(&self.conn, term)?,
                    None => fetch_instructors(&self.conn)?,
                };
                self.instructors.set_rows_focused(rows, |i| {
                    matches!(focus, Focus::Instructor(id) if id == i.id)
                });
            }
            Tab::Courses => {
                let rows = match self.courses.active_filter() {
                    Some(term) => filter_course_listings(&self.conn, term)?,
                    None => fetch_course_listings(&self.conn)?,
                };
                self.courses.set_rows_focused(rows, |l| {
                    matches!(focus, Focus::Course(id) if id == l.course.id)
                });
            }
            Tab::Enrollments => {
                let all = fetch_enrollments(&self.conn)?;
                let rows = match self.enrollments.active_filter() {
                    Some(term) => filter_enrollments(all, term),
                    None => all,
                };
                self.enrollments.set_rows_focused(rows, |e| {
                    matches!(focus, Focus::Enrollment(s, c) if s == e.student_id && c == e.course_id)
                });
            }
        }
        debug!(tab = tab.title(), "tab reloaded");
        Ok(())
    }

    fn instructor_choices(&self) -> Result<Vec<Choice>> {
        Ok(fetch_instructors(&self.conn)?
            .iter()
            .map(Choice::instructor)
            .collect())
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.clear_status();
    }

    fn cursor(&mut self) -> &mut dyn Navigable {
        match self.tab {
            Tab::Students => &mut self.students,
            Tab::Instructors => &mut self.instructors,
            Tab::Courses => &mut self.courses,
            Tab::Enrollments => &mut self.enrollments,
        }
    }

    /// Show a failed operation in the footer and log it. Returns the message
    /// so forms can repeat it inline.
    fn report_error(&mut self, err: &Error) -> String {
        let message = surface_error(err);
        let database_failure = err
            .downcast_ref::<SchoolError>()
            .is_some_and(|school_err| !school_err.is_rejection());
        if database_failure {
            error!(error = %format!("{err:#}"), "database operation failed");
        } else {
            warn!(error = %message, "operation rejected");
        }
        self.set_status(message.clone(), StatusKind::Error);
        message
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Students => self.draw_people(frame, chunks[1], &self.students),
            Tab::Instructors => self.draw_people(frame, chunks[1], &self.instructors),
            Tab::Courses => self.draw_courses(frame, chunks[1]),
            Tab::Enrollments => self.draw_enrollments(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingPerson { kind, form } => {
                self.draw_person_form(frame, area, &format!("Add {}", kind.label()), form)
            }
            Mode::EditingPerson { kind, form, .. } => {
                self.draw_person_form(frame, area, &format!("Edit {}", kind.label()), form)
            }
            Mode::AddingCourse(form) => self.draw_course_form(frame, area, "Add Course", form),
            Mode::EditingCourse { form, .. } => {
                self.draw_course_form(frame, area, "Edit Course", form)
            }
            Mode::Pairing(form) => self.draw_pair_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Filtering(state) => self.draw_filter_bar(frame, chunks[1], state),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new(
            Tab::ALL
                .iter()
                .enumerate()
                .map(|(idx, tab)| format!("{} {}", idx + 1, tab.title())),
        )
        .select(self.tab.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("School Manager"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(tabs, area);
    }

    fn table_title(&self) -> String {
        match self.current_filter() {
            Some(term) => format!("{} (filter: {term})", self.tab.title()),
            None => self.tab.title().to_string(),
        }
    }

    fn draw_table(
        &self,
        frame: &mut Frame,
        area: Rect,
        header: &[&'static str],
        widths: &[Constraint],
        rows: Vec<Row<'static>>,
        selected: usize,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.table_title());

        if rows.is_empty() {
            let hint = if self.current_filter().is_some() {
                "No rows match the filter. Press Esc to clear it."
            } else if self.tab == Tab::Enrollments {
                "No enrollments yet. Press 'r' to register a student."
            } else {
                "Nothing here yet. Press '+' to add one."
            };
            let message = Paragraph::new(hint)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(header.iter().copied()).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        let table = Table::new(rows, widths.to_vec())
            .header(header)
            .block(block)
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_people<T: PersonRow>(&self, frame: &mut Frame, area: Rect, list: &ListScreen<T>) {
        let rows = list
            .rows
            .iter()
            .map(|p| {
                let (id, name, age, email) = p.columns();
                Row::new(vec![id.to_string(), name.to_string(), age.to_string(), email.to_string()])
            })
            .collect();
        self.draw_table(
            frame,
            area,
            &["ID", "Name", "Age", "Email"],
            &[
                Constraint::Length(6),
                Constraint::Percentage(35),
                Constraint::Length(5),
                Constraint::Percentage(50),
            ],
            rows,
            list.selected,
        );
    }

    fn draw_courses(&self, frame: &mut Frame, area: Rect) {
        let rows = self
            .courses
            .rows
            .iter()
            .map(|l| {
                Row::new(vec![
                    l.course.id.to_string(),
                    l.course.name.clone(),
                    l.instructor_label(),
                ])
            })
            .collect();
        self.draw_table(
            frame,
            area,
            &["ID", "Course Name", "Instructor"],
            &[
                Constraint::Length(6),
                Constraint::Percentage(50),
                Constraint::Percentage(45),
            ],
            rows,
            self.courses.selected,
        );
    }

    fn draw_enrollments(&self, frame: &mut Frame, area: Rect) {
        let rows = self
            .enrollments
            .rows
            .iter()
            .map(|e| {
                Row::new(vec![
                    format!("{} (#{})", e.student_name, e.student_id),
                    format!("{} (#{})", e.course_name, e.course_id),
                ])
            })
            .collect();
        self.draw_table(
            frame,
            area,
            &["Student", "Course"],
            &[Constraint::Percentage(50), Constraint::Percentage(50)],
            rows,
            self.enrollments.selected,
        );
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&'static str, &'static str)] = match (&self.mode, self.tab) {
            (Mode::Filtering(_), _) => &[("[Enter]", "Keep Filter"), ("[Esc]", "Clear")],
            (Mode::ConfirmDelete(_), _) => &[("[y]", "Confirm"), ("[n/Esc]", "Cancel")],
            (Mode::Pairing(_), _) | (Mode::AddingCourse(_), _) | (Mode::EditingCourse { .. }, _) => {
                &[
                    ("[Tab]", "Switch Field"),
                    ("[↑↓]", "Choose"),
                    ("[Enter]", "Save"),
                    ("[Esc]", "Cancel"),
                ]
            }
            (Mode::AddingPerson { .. }, _) | (Mode::EditingPerson { .. }, _) => &[
                ("[Tab]", "Next Field"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (Mode::Normal, Tab::Enrollments) => &[
                ("[Tab]", "Next Tab"),
                ("[↑↓]", "Select"),
                ("[r/+]", "Register"),
                ("[-]", "Unregister"),
                ("[f]", "Filter"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, _) => &[
                ("[Tab]", "Next Tab"),
                ("[↑↓]", "Select"),
                ("[+]", "Add"),
                ("[e]", "Edit"),
                ("[-]", "Delete"),
                ("[f]", "Filter"),
                ("[r]", "Register"),
                ("[a]", "Assign"),
                ("[q]", "Quit"),
            ],
        };
        Line::from(key_hints(hints))
    }

    /// Shared popup chrome: clears the area, draws the bordered block, and
    /// returns the inner rectangle.
    fn draw_popup(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        mut lines: Vec<Line<'static>>,
        error: Option<&String>,
    ) -> Rect {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        if let Some(error) = error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
        inner
    }

    fn draw_person_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &PersonForm) {
        let fields = [
            ("Name", PersonField::Name),
            ("Age", PersonField::Age),
            ("Email", PersonField::Email),
        ];
        let lines = fields
            .iter()
            .map(|(label, field)| form.build_line(label, *field))
            .collect();
        let inner = self.draw_popup(frame, area, title, lines, form.error.as_ref());

        if let Some((row, (label, field))) = fields
            .iter()
            .enumerate()
            .find(|(_, (_, field))| *field == form.active)
        {
            let prefix = format!("{label}: ").len() as u16;
            let cursor_x = inner.x + prefix + form.value_len(*field) as u16;
            frame.set_cursor_position((cursor_x, inner.y + row as u16));
        }
    }

    fn draw_course_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &CourseForm) {
        let inner = self.draw_popup(frame, area, title, form.build_lines(), form.error.as_ref());
        if form.active == CourseField::Name {
            let prefix = "Course Name: ".len() as u16;
            frame.set_cursor_position((inner.x + prefix + form.name_len() as u16, inner.y));
        }
    }

    fn draw_pair_form(&self, frame: &mut Frame, area: Rect, form: &PairForm) {
        self.draw_popup(
            frame,
            area,
            form.action.title(),
            form.build_lines(),
            form.error.as_ref(),
        );
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let consequence = match confirm.target {
            DeleteTarget::Person {
                kind: PersonKind::Student,
                ..
            } => "Their course registrations are removed too.",
            DeleteTarget::Person {
                kind: PersonKind::Instructor,
                ..
            } => "Courses they teach become unassigned.",
            DeleteTarget::Course { .. } => "All registrations for it are removed too.",
            DeleteTarget::Enrollment { .. } => "The student and course are kept.",
        };

        let mut lines = vec![
            Line::from(confirm.prompt()),
            Line::from(consequence),
            Line::from(""),
        ];
        if let Some(error) = &confirm.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_filter_bar(&self, frame: &mut Frame, area: Rect, state: &FilterState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Filter");
        let paragraph = Paragraph::new(Span::raw(format!("Filter: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Filter: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

/// Tab that owns the row a write focused on.
fn focus_tab(focus: Focus) -> Option<Tab> {
    match focus {
        Focus::Nothing => None,
        Focus::Student(_) => Some(Tab::Students),
        Focus::Instructor(_) => Some(Tab::Instructors),
        Focus::Course(_) => Some(Tab::Courses),
        Focus::Enrollment(..) => Some(Tab::Enrollments),
    }
}

/// Column access shared by the two person tables so one renderer serves
/// both.
trait PersonRow {
    fn columns(&self) -> (i64, &str, i64, &str);
}

impl PersonRow for Student {
    fn columns(&self) -> (i64, &str, i64, &str) {
        (self.id, &self.name, self.age, &self.email)
    }
}

impl PersonRow for Instructor {
    fn columns(&self) -> (i64, &str, i64, &str) {
        (self.id, &self.name, self.age, &self.email)
    }
}
