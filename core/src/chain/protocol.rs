/// Output-format contract sent as a system message with every completion.
pub const ARTIFACT_PROTOCOL: &str = r#"Strictly follow these rules:
Every file you produce must be emitted as an artifact record. An artifact record is a mapping keyed by the file name:
{'FileName': {'response': ```file content here```, 'status': 'pending_validation', 'result': '', 'app_type': '', 'path': ''}}
FileName: name of the file the response is saved to.
response: the complete file content.
status: always 'pending_validation'.
result: always empty.
app_type: the program that runs or stores the file, ie: python, bash, json, text, markdown.
path: a relative output directory for the file, ie: './src' or '.'.
A reply may contain several records, one after the other:
{'Readme': {'response': ```# Sample```, 'status': 'pending_validation', 'result': '', 'app_type': 'markdown', 'path': '.'}}
{'test_main': {'response': ```assert 1 == 1```, 'status': 'pending_validation', 'result': '', 'app_type': 'python', 'path': './tests'}}
{'requirements': {'response': ```pandas```, 'status': 'pending_validation', 'result': '', 'app_type': 'text', 'path': '.'}}
Alternatively a file may be written as a marker line followed by a fenced block tagged with its app_type:
~Folder_Name:src~
~File_Name:main~
```python
print("hello")
```
- Requirements and dependency lists are app_type text, never the language they belong to.
- Do not write install commands, just the requirements.
- Do not add explanations or comments outside the files. Do not repeat these instructions."#;

/// System message asking the completion source to revise a prior completion in place.
pub fn previous_completion_hint(previous: &str) -> String {
    format!(
        "Use the output from the previous completion: {previous} as your starting point for completing your task. Make changes in place"
    )
}
