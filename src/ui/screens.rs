use crate::models::Enrollment;

/// The four tables the UI can show, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Tab {
    Students,
    Instructors,
    Courses,
    Enrollments,
}

impl Tab {
    pub(crate) const ALL: [Tab; 4] = [
        Tab::Students,
        Tab::Instructors,
        Tab::Courses,
        Tab::Enrollments,
    ];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Tab::Students => "Students",
            Tab::Instructors => "Instructors",
            Tab::Courses => "Courses",
            Tab::Enrollments => "Enrollments",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Tab::Students => 0,
            Tab::Instructors => 1,
            Tab::Courses => 2,
            Tab::Enrollments => 3,
        }
    }

    /// Neighbouring tab, wrapping around.
    pub(crate) fn offset(self, by: isize) -> Tab {
        let len = Self::ALL.len() as isize;
        let idx = (self.index() as isize + by).rem_euclid(len) as usize;
        Self::ALL[idx]
    }
}

/// Rows for one tab plus the cursor and the active filter. Rows are loaded
/// already filtered; `filter` only records what was asked for so reloads can
/// repeat it.
pub(crate) struct ListScreen<T> {
    pub(crate) rows: Vec<T>,
    pub(crate) selected: usize,
    pub(crate) filter: Option<String>,
}

impl<T> Default for ListScreen<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            selected: 0,
            filter: None,
        }
    }
}

impl<T> ListScreen<T> {
    pub(crate) fn new(rows: Vec<T>) -> Self {
        let mut screen = Self::default();
        screen.set_rows(rows);
        screen
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.rows.get(self.selected)
    }

    /// Replace the rows, keeping the cursor in bounds.
    pub(crate) fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.ensure_in_bounds();
    }

    /// Replace the rows and move the cursor onto the first row matching
    /// `focus`, when there is one.
    pub(crate) fn set_rows_focused<F>(&mut self, rows: Vec<T>, focus: F)
    where
        F: Fn(&T) -> bool,
    {
        self.rows = rows;
        if let Some(idx) = self.rows.iter().position(focus) {
            self.selected = idx;
        }
        self.ensure_in_bounds();
    }

    /// Trimmed filter text, `None` when no filter or only whitespace.
    pub(crate) fn active_filter(&self) -> Option<&str> {
        self.filter
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.rows.is_empty() {
            return;
        }
        let len = self.rows.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }
}

/// Cursor movement independent of the row type, so key handling can drive
/// whichever tab is showing.
pub(crate) trait Navigable {
    fn move_selection(&mut self, offset: isize);
    fn select_first(&mut self);
    fn select_last(&mut self);
}

impl<T> Navigable for ListScreen<T> {
    fn move_selection(&mut self, offset: isize) {
        ListScreen::move_selection(self, offset);
    }

    fn select_first(&mut self) {
        ListScreen::select_first(self);
    }

    fn select_last(&mut self) {
        ListScreen::select_last(self);
    }
}

/// Enrollments have no SQL filter of their own; match the term against the
/// student and course names in memory, case-insensitively.
pub(crate) fn filter_enrollments(rows: Vec<Enrollment>, term: &str) -> Vec<Enrollment> {
    let needle = term.to_lowercase();
    rows.into_iter()
        .filter(|e| {
            e.student_name.to_lowercase().contains(&needle)
                || e.course_name.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_offset_wraps() {
        assert_eq!(Tab::Students.offset(-1), Tab::Enrollments);
        assert_eq!(Tab::Enrollments.offset(1), Tab::Students);
        assert_eq!(Tab::Instructors.offset(1), Tab::Courses);
    }

    #[test]
    fn selection_is_clamped() {
        let mut screen = ListScreen::new(vec![1, 2, 3]);
        screen.move_selection(10);
        assert_eq!(screen.current(), Some(&3));
        screen.move_selection(-10);
        assert_eq!(screen.current(), Some(&1));
        screen.select_last();
        screen.set_rows(vec![1]);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn empty_screen_has_no_current_row() {
        let mut screen: ListScreen<i32> = ListScreen::new(Vec::new());
        screen.move_selection(1);
        screen.select_last();
        assert_eq!(screen.current(), None);
    }

    #[test]
    fn focus_follows_matching_row() {
        let mut screen = ListScreen::new(vec![1, 2, 3]);
        screen.set_rows_focused(vec![4, 5, 6], |v| *v == 5);
        assert_eq!(screen.current(), Some(&5));
    }

    #[test]
    fn whitespace_filter_is_inactive() {
        let mut screen: ListScreen<i32> = ListScreen::default();
        screen.filter = Some("   ".into());
        assert_eq!(screen.active_filter(), None);
        screen.filter = Some(" ada ".into());
        assert_eq!(screen.active_filter(), Some("ada"));
    }

    #[test]
    fn enrollment_filter_checks_both_names() {
        let rows = vec![
            Enrollment {
                student_id: 1,
                student_name: "Ada".into(),
                course_id: 1,
                course_name: "Math".into(),
            },
            Enrollment {
                student_id: 2,
                student_name: "Bob".into(),
                course_id: 2,
                course_name: "Art".into(),
            },
        ];
        let matched = filter_enrollments(rows.clone(), "MAT");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].student_name, "Ada");
        assert_eq!(filter_enrollments(rows, "b").len(), 1);
    }
}
