pub const TRACEZ_STYLES: &str = r#"
.tracez {
    font-family: system-ui, -apple-system, sans-serif;
    color: var(--text-primary, #111827);
    padding: 1rem 1.5rem;
}

.tracez-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    gap: 0.8rem;
    margin-bottom: 0.8rem;
}

.tracez-title {
    margin: 0;
    font-size: 1.4rem;
}

.tracez-refresh {
    display: flex;
    align-items: center;
    gap: 0.45rem;
    font-size: 0.78rem;
    color: var(--text-secondary, #4b5563);
}

.tracez-refresh-button {
    border: 1px solid var(--border-color, #cbd5e1);
    background: var(--bg-secondary, #f8fafc);
    border-radius: 0.45rem;
    padding: 0.32rem 0.65rem;
    font-size: 0.72rem;
    cursor: pointer;
}

.tracez-refresh-button:hover {
    background: var(--bg-primary, #e2e8f0);
}

.tracez-table {
    width: 100%;
    table-layout: fixed;
    border-collapse: collapse;
    margin-bottom: 1.2rem;
    font-size: 0.78rem;
}

.tracez-table th,
.tracez-table td {
    border: 1px solid var(--border-color, #e2e8f0);
    padding: 0.3rem 0.45rem;
    text-align: left;
    vertical-align: top;
    overflow-wrap: anywhere;
}

.tracez-table th {
    background: var(--bg-secondary, #f1f5f9);
    font-weight: 600;
}

.tracez-table col.sm {
    width: 6%;
}

.tracez-table col.md {
    width: 20%;
}

.tracez-table td.click {
    cursor: pointer;
    color: var(--accent-bg, #2563eb);
    text-align: right;
}

.tracez-table td.click:hover {
    background: color-mix(in srgb, var(--accent-bg, #2563eb) 10%, transparent);
}

.tracez-table .empty {
    color: var(--text-secondary, #9ca3af);
    font-style: italic;
}

.tracez-table pre {
    margin: 0;
    white-space: pre-wrap;
    font-size: 0.7rem;
}

.tracez-subheading h2 {
    margin: 0.4rem 0 0.2rem 0;
    font-size: 1.05rem;
}

.tracez-subheading i {
    display: block;
    margin-bottom: 0.6rem;
    font-size: 0.75rem;
    color: var(--text-secondary, #4b5563);
}
"#;
