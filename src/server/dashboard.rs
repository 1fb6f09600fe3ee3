//! Dashboard HTML rendering.

use chrono::Utc;

use crate::storage::Stats;

/// Renders the stats dashboard page.
#[must_use]
pub fn render_dashboard(stats: &Stats) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>TikTok Downloader Bot - Dashboard</title>
    <style>
        :root {{
            --bg-primary: #0f0f1a;
            --bg-secondary: #1a1a2e;
            --bg-card: rgba(255, 255, 255, 0.05);
            --text-primary: #ffffff;
            --text-secondary: #a0a0b0;
            --accent: #00d4ff;
            --accent-secondary: #7b2cbf;
            --success: #00ff88;
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: 'Inter', sans-serif;
            background: linear-gradient(135deg, var(--bg-primary) 0%, var(--bg-secondary) 100%);
            min-height: 100vh;
            color: var(--text-primary);
            padding: 2rem;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; }}
        header {{ text-align: center; margin-bottom: 3rem; }}
        h1 {{
            font-size: 2.5rem;
            background: linear-gradient(90deg, var(--accent), var(--accent-secondary));
            -webkit-background-clip: text;
            -webkit-text-fill-color: transparent;
            margin-bottom: 0.5rem;
        }}
        .subtitle {{ color: var(--text-secondary); font-size: 1.1rem; }}
        .stats-grid {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(250px, 1fr));
            gap: 1.5rem;
            margin-bottom: 3rem;
        }}
        .stat-card {{
            background: var(--bg-card);
            border: 1px solid rgba(255, 255, 255, 0.1);
            border-radius: 16px;
            padding: 2rem;
            text-align: center;
        }}
        .stat-icon {{ font-size: 2.5rem; margin-bottom: 1rem; }}
        .stat-value {{ font-size: 2.5rem; font-weight: 700; margin-bottom: 0.5rem; }}
        .stat-value.users {{ color: var(--accent); }}
        .stat-value.downloads {{ color: var(--success); }}
        .stat-value.today {{ color: var(--accent-secondary); }}
        .stat-label {{
            color: var(--text-secondary);
            font-size: 1rem;
            text-transform: uppercase;
            letter-spacing: 1px;
        }}
        footer {{
            text-align: center;
            margin-top: 3rem;
            color: var(--text-secondary);
            font-size: 0.9rem;
        }}
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>🎬 TikTok Downloader Bot</h1>
            <p class="subtitle">Download TikTok videos without watermark via Telegram</p>
        </header>

        <div class="stats-grid">
            <div class="stat-card">
                <div class="stat-icon">👥</div>
                <div class="stat-value users">{users}</div>
                <div class="stat-label">Total Users</div>
            </div>

            <div class="stat-card">
                <div class="stat-icon">📥</div>
                <div class="stat-value downloads">{downloads}</div>
                <div class="stat-label">Total Downloads</div>
            </div>

            <div class="stat-card">
                <div class="stat-icon">✅</div>
                <div class="stat-value downloads">{successful}</div>
                <div class="stat-label">Successful</div>
            </div>

            <div class="stat-card">
                <div class="stat-icon">📅</div>
                <div class="stat-value today">{today}</div>
                <div class="stat-label">Today's Downloads</div>
            </div>
        </div>

        <footer>
            <p>Last updated: {updated} UTC</p>
        </footer>
    </div>

    <script>
        // Auto-refresh stats every 30 seconds
        setTimeout(() => location.reload(), 30000);
    </script>
</body>
</html>
"#,
        users = format_count(stats.users),
        downloads = format_count(stats.downloads),
        successful = format_count(stats.successful),
        today = format_count(stats.today),
        updated = Utc::now().format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Formats a counter with thousands separators.
fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
