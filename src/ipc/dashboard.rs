//! HTML 대시보드 — JSON 엔드포인트의 얇은 렌더링.
//!
//! 단일 페이지: 모듈 정보 패널, Odoo 상태 패널(새로고침/시작 버튼),
//! 퀵 링크. JS가 JSON API를 fetch하고 10초마다 상태를 재폴링한다.

/// 런타임 포트를 치환해 대시보드 페이지를 렌더링한다.
pub fn render(module_name: &str, odoo_port: u16) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{module_name} - Module Server</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }}
        .status {{ padding: 15px; margin: 10px 0; border-radius: 5px; }}
        .success {{ background: #d4edda; border: 1px solid #c3e6cb; }}
        .error {{ background: #f8d7da; border: 1px solid #f5c6cb; }}
        .info {{ background: #d1ecf1; border: 1px solid #bee5eb; }}
        button {{ padding: 10px 20px; margin: 5px; cursor: pointer; }}
        .module-info {{ background: #f8f9fa; padding: 20px; border-radius: 5px; margin: 20px 0; }}
    </style>
</head>
<body>
    <h1>🌍 {module_name}</h1>
    <div class="module-info">
        <h2>Module Information</h2>
        <div id="moduleInfo">Loading...</div>
    </div>

    <div class="module-info">
        <h2>Odoo Status</h2>
        <div id="odooStatus">Checking...</div>
        <button onclick="checkStatus()">Refresh Status</button>
        <button onclick="startOdoo()">Start Odoo</button>
    </div>

    <div class="module-info">
        <h2>Quick Links</h2>
        <p><a href="http://localhost:{odoo_port}" target="_blank">Odoo Interface (http://localhost:{odoo_port})</a></p>
        <p><a href="/api/module/info">Module Info (JSON)</a></p>
        <p><a href="/api/odoo/status">Odoo Status (JSON)</a></p>
    </div>

    <script>
        function loadInfo() {{
            fetch('/api/module/info')
                .then(r => r.json())
                .then(data => {{
                    document.getElementById('moduleInfo').innerHTML =
                        '<pre>' + JSON.stringify(data, null, 2) + '</pre>';
                }});

            checkStatus();
        }}

        function checkStatus() {{
            fetch('/api/odoo/status')
                .then(r => r.json())
                .then(data => {{
                    const status = data.running ?
                        '<div class="status success">✅ Odoo is RUNNING</div>' :
                        '<div class="status error">❌ Odoo is NOT running</div>';
                    document.getElementById('odooStatus').innerHTML =
                        status + '<pre>' + JSON.stringify(data, null, 2) + '</pre>';
                }});
        }}

        function startOdoo() {{
            fetch('/api/odoo/start', {{ method: 'POST' }})
                .then(r => r.json())
                .then(data => {{
                    alert(data.message || JSON.stringify(data));
                    setTimeout(checkStatus, 2000);
                }});
        }}

        loadInfo();
        setInterval(checkStatus, 10000);
    </script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_port() {
        let html = render("GlobeTrotter Smart Planner", 8069);
        assert!(html.contains("http://localhost:8069"));
        assert!(html.contains("GlobeTrotter Smart Planner"));
        assert!(html.contains("/api/odoo/start"));
    }

    #[test]
    fn test_render_is_valid_document() {
        let html = render("Test", 9000);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>\n"));
    }
}
