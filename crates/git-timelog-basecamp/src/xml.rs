//! Readers for the Basecamp XML documents the hook cares about.

use git_timelog_core::CandidateTask;
use quick_xml::Reader;
use quick_xml::events::Event;

/// One step of a document walk.
enum Node<'a> {
    Open(&'a str),
    Close(&'a str),
    Text(&'a str),
}

/// Walk `xml`, calling `visit` with the path of open elements (innermost last).
fn walk(xml: &str, mut visit: impl FnMut(&[String], Node<'_>)) -> Result<(), quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                visit(&path, Node::Open(&name));
                path.push(name);
            }
            Event::Empty(empty) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                visit(&path, Node::Open(&name));
                visit(&path, Node::Close(&name));
            }
            Event::End(_) => {
                if let Some(name) = path.pop() {
                    visit(&path, Node::Close(&name));
                }
            }
            Event::Text(text) => {
                let value = text.unescape()?;
                visit(&path, Node::Text(&value));
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data);
                visit(&path, Node::Text(&value));
            }
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

fn innermost(path: &[String]) -> Option<&str> {
    path.last().map(String::as_str)
}

fn parent(path: &[String]) -> Option<&str> {
    path.len()
        .checked_sub(2)
        .and_then(|idx| path.get(idx))
        .map(String::as_str)
}

/// The `<id>` of the authenticated person (`/me.xml`).
///
/// # Errors
/// Returns an error if the document is not well-formed.
pub fn person_id(xml: &str) -> Result<Option<u64>, quick_xml::Error> {
    let mut id = None;
    walk(xml, |path, node| {
        if let Node::Text(text) = node
            && id.is_none()
            && path.len() == 2
            && innermost(path) == Some("id")
        {
            id = text.trim().parse().ok();
        }
    })?;
    Ok(id)
}

/// Every `<error>` message, in document order.
///
/// # Errors
/// Returns an error if the document is not well-formed.
pub fn error_messages(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut errors = Vec::new();
    walk(xml, |path, node| {
        if let Node::Text(text) = node
            && innermost(path) == Some("error")
        {
            errors.push(text.trim().to_owned());
        }
    })?;
    Ok(errors)
}

#[derive(Default)]
struct TodoItem {
    id: Option<u64>,
    content: Option<String>,
    completed: Option<bool>,
}

impl TodoItem {
    fn set(&mut self, field: &str, value: &str) {
        match field {
            "id" => self.id = value.trim().parse().ok(),
            "content" => self.content = Some(value.trim().to_owned()),
            "completed" => self.completed = value.trim().parse().ok(),
            _ => {}
        }
    }

    fn into_candidate(self) -> Option<CandidateTask> {
        match (self.id, self.completed) {
            (Some(id), Some(false)) => Some(CandidateTask::new(id, self.content.unwrap_or_default())),
            _ => None,
        }
    }
}

/// Incomplete items of every to-do list belonging to `project_id`
/// (`/todo_lists.xml`).
///
/// # Errors
/// Returns an error if the document is not well-formed.
pub fn incomplete_tasks(xml: &str, project_id: u64) -> Result<Vec<CandidateTask>, quick_xml::Error> {
    let mut tasks = Vec::new();
    let mut list_project: Option<u64> = None;
    let mut list_items: Vec<TodoItem> = Vec::new();
    let mut item: Option<TodoItem> = None;

    walk(xml, |path, node| match node {
        Node::Open("todo-list") => {
            list_project = None;
            list_items.clear();
        }
        Node::Open("todo-item") => item = Some(TodoItem::default()),
        Node::Close("todo-item") => {
            if let Some(done) = item.take() {
                list_items.push(done);
            }
        }
        Node::Close("todo-list") => {
            let items = std::mem::take(&mut list_items);
            if list_project == Some(project_id) {
                tasks.extend(items.into_iter().filter_map(TodoItem::into_candidate));
            }
        }
        Node::Text(text) => match (parent(path), innermost(path)) {
            (Some("todo-list"), Some("project-id")) => list_project = text.trim().parse().ok(),
            (Some("todo-item"), Some(field)) => {
                if let Some(current) = item.as_mut() {
                    current.set(field, text);
                }
            }
            _ => {}
        },
        Node::Open(_) | Node::Close(_) => {}
    })?;
    Ok(tasks)
}
